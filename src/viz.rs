//! Chart rendering with Plotters for the three dashboard views

use plotters::prelude::*;

use crate::data::Record;

/// Color palette cycled across towns
const TOWN_COLORS: [RGBColor; 8] = [
    RED,
    BLUE,
    GREEN,
    MAGENTA,
    CYAN,
    RGBColor(255, 140, 0),
    RGBColor(128, 0, 128),
    RGBColor(0, 128, 128),
];

#[derive(Debug, Clone, Copy)]
struct RectF {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
}

/// Render a one-level tree map of towns within the chosen region
///
/// Rectangle area is proportional to the town's case count. An empty or
/// all-zero subset yields a blank titled chart rather than an error.
pub fn render_tree_map(records: &[Record], region: &str, output_path: &str) -> crate::Result<()> {
    let root = BitMapBackend::new(output_path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let title = format!("Tree Map of COVID-19 Cases in {}", region);
    let root = root.titled(&title, ("sans-serif", 30))?;

    let weights: Vec<f64> = records
        .iter()
        .map(|r| r.case_count.unwrap_or(0.0))
        .collect();

    if !records.is_empty() && weights.iter().sum::<f64>() > 0.0 {
        let (width, height) = root.dim_in_pixel();
        let bounds = RectF {
            x0: 0.0,
            y0: 0.0,
            x1: width as f64,
            y1: height as f64,
        };
        let rects = layout_rects(&weights, bounds);

        for (i, (record, rect)) in records.iter().zip(rects.iter()).enumerate() {
            let color = TOWN_COLORS[i % TOWN_COLORS.len()];
            let corners = [
                (rect.x0 as i32, rect.y0 as i32),
                (rect.x1 as i32, rect.y1 as i32),
            ];
            root.draw(&Rectangle::new(corners, color.mix(0.6).filled()))?;
            root.draw(&Rectangle::new(corners, WHITE.stroke_width(2)))?;

            // label only the boxes with room for one
            if rect.x1 - rect.x0 > 70.0 && rect.y1 - rect.y0 > 26.0 {
                let label = format!("{} ({})", record.town, weights[i]);
                root.draw(&Text::new(
                    label,
                    (rect.x0 as i32 + 6, rect.y0 as i32 + 6),
                    ("sans-serif", 14),
                ))?;
            }
        }
    }

    root.present()?;
    println!("Tree map saved to: {}", output_path);

    Ok(())
}

/// Slice-and-dice layout: split the rectangle in two along its longer side,
/// weight balanced across the halves, and recurse
fn layout_rects(weights: &[f64], bounds: RectF) -> Vec<RectF> {
    let mut order: Vec<usize> = (0..weights.len()).collect();
    order.sort_by(|a, b| {
        weights[*b]
            .partial_cmp(&weights[*a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut out = vec![bounds; weights.len()];
    subdivide(&order, weights, bounds, &mut out);
    out
}

fn subdivide(indices: &[usize], weights: &[f64], bounds: RectF, out: &mut [RectF]) {
    match indices {
        [] => {}
        [only] => out[*only] = bounds,
        _ => {
            let total: f64 = indices.iter().map(|&i| weights[i]).sum();

            // cut where the prefix weight crosses half the total
            let mut cut = 1;
            let mut prefix = weights[indices[0]];
            while cut < indices.len() - 1 && prefix < total / 2.0 {
                prefix += weights[indices[cut]];
                cut += 1;
            }
            let frac = if total > 0.0 {
                prefix / total
            } else {
                cut as f64 / indices.len() as f64
            };

            let (left, right) = indices.split_at(cut);
            let (first, second) = split_rect(bounds, frac);
            subdivide(left, weights, first, out);
            subdivide(right, weights, second, out);
        }
    }
}

fn split_rect(r: RectF, frac: f64) -> (RectF, RectF) {
    if r.x1 - r.x0 >= r.y1 - r.y0 {
        let xm = r.x0 + (r.x1 - r.x0) * frac;
        (RectF { x1: xm, ..r }, RectF { x0: xm, ..r })
    } else {
        let ym = r.y0 + (r.y1 - r.y0) * frac;
        (RectF { y1: ym, ..r }, RectF { y0: ym, ..r })
    }
}

/// Render case counts across towns in dataset order, one point per record
pub fn render_line_chart(records: &[Record], output_path: &str) -> crate::Result<()> {
    let root = BitMapBackend::new(output_path, (1000, 400)).into_drawing_area();
    root.fill(&WHITE)?;

    let points: Vec<(f64, f64)> = records
        .iter()
        .enumerate()
        .filter_map(|(i, r)| r.case_count.map(|c| (i as f64, c)))
        .collect();
    let labels: Vec<String> = records.iter().map(|r| r.town.clone()).collect();

    let x_max = records.len().saturating_sub(1).max(1) as f64;
    let y_max = points.iter().map(|p| p.1).fold(0.0f64, f64::max).max(1.0) * 1.1;

    let mut chart = ChartBuilder::on(&root)
        .caption("COVID-19 Cases Over Towns", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..x_max, 0f64..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Town")
        .y_desc("Number of COVID-19 Cases")
        .x_labels(labels.len().clamp(1, 20))
        .x_label_formatter(&|x| {
            let idx = x.round() as usize;
            labels.get(idx).cloned().unwrap_or_default()
        })
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(LineSeries::new(points.iter().copied(), &BLUE))?;
    chart.draw_series(
        points
            .iter()
            .map(|&(x, y)| Circle::new((x, y), 3, BLUE.filled())),
    )?;

    root.present()?;
    println!("Line chart saved to: {}", output_path);

    Ok(())
}

/// Render the bubble chart: percentage of national cases on x, case count on
/// y, bubble size driven by the chronic-disease score, color grouped by town.
///
/// Records with a null percentage survive filtering but have no x position,
/// so they are skipped at draw time only.
pub fn render_bubble_chart(records: &[Record], output_path: &str) -> crate::Result<()> {
    let root = BitMapBackend::new(output_path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let placed: Vec<(f64, f64, f64, &str)> = records
        .iter()
        .filter_map(|r| match (r.pct_of_national, r.case_count) {
            (Some(x), Some(y)) => Some((x, y, r.chronic_disease_score(), r.town.as_str())),
            _ => None,
        })
        .collect();

    // bounds padded around the data, or a unit box when nothing is placeable
    let (x_min, x_max, y_min, y_max) = if placed.is_empty() {
        (0.0, 1.0, 0.0, 1.0)
    } else {
        (
            placed.iter().map(|p| p.0).fold(f64::INFINITY, f64::min) - 0.5,
            placed.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max) + 0.5,
            placed.iter().map(|p| p.1).fold(f64::INFINITY, f64::min) - 0.5,
            placed.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max) + 0.5,
        )
    };

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "COVID-19 Cases vs. Percentage of National Cases",
            ("sans-serif", 30),
        )
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Percentage of National Cases")
        .y_desc("Number of COVID-19 Cases")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    let mut town_order: Vec<&str> = Vec::new();
    for p in &placed {
        if !town_order.contains(&p.3) {
            town_order.push(p.3);
        }
    }

    for (ti, town) in town_order.iter().enumerate() {
        let color = TOWN_COLORS[ti % TOWN_COLORS.len()];
        chart
            .draw_series(placed.iter().filter(|p| p.3 == *town).map(
                |&(x, y, score, _)| {
                    let radius = 4 + (score * 3.0).round() as i32;
                    Circle::new((x, y), radius, color.mix(0.7).filled())
                },
            ))?
            .label(*town)
            .legend(move |(x, y)| Circle::new((x + 5, y), 4, color.filled()));
    }

    if !town_order.is_empty() {
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
    }

    root.present()?;
    println!("Bubble chart saved to: {}", output_path);

    Ok(())
}
