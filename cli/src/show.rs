use crate::commands::ShowCmd;
use crate::CliError;

use std::io::Write;

use vector_image::{CurveKind, Loader, Paint, VectorShape};

pub fn show(mut cmd: ShowCmd) -> Result<(), CliError> {
    let image = Loader::new()
        .with_options(cmd.options)
        .load(&cmd.input)?;

    let output = &mut *cmd.output;

    writeln!(
        output,
        "{:?}: {}x{}{}, {} shapes, {} paths, {} edges, {} bytes",
        cmd.input,
        image.width(),
        image.height(),
        cmd.options.units,
        image.len(),
        image.num_paths(),
        image.num_edges(),
        image.memory_size(),
    )?;

    for (idx, shape) in image.shapes().enumerate() {
        write_shape(output, idx, &shape)?;

        for (path_idx, path) in shape.paths().enumerate() {
            writeln!(
                output,
                "    path #{} {} edges{}",
                path_idx,
                path.len(),
                if path.is_closed() { " (closed)" } else { "" },
            )?;

            if !cmd.edges {
                continue;
            }

            for edge in path.edges() {
                let (x, y) = (edge.end.x, edge.end.y);
                match edge.kind {
                    CurveKind::Line => writeln!(output, "      L {} {}", x, y)?,
                    CurveKind::QuadraticFrom1 => {
                        let ctrl = edge.control2;
                        writeln!(output, "      Q {} {} {} {}", ctrl.x, ctrl.y, x, y)?
                    }
                    CurveKind::QuadraticFrom2 => {
                        let ctrl = edge.control1;
                        writeln!(output, "      Q {} {} {} {}", ctrl.x, ctrl.y, x, y)?
                    }
                    CurveKind::Cubic => writeln!(
                        output,
                        "      C {} {} {} {} {} {}",
                        edge.control1.x, edge.control1.y, edge.control2.x, edge.control2.y, x, y
                    )?,
                }
            }
        }
    }

    Ok(())
}

fn write_shape(output: &mut dyn Write, idx: usize, shape: &VectorShape) -> Result<(), CliError> {
    let bounds = shape.bounds();
    writeln!(
        output,
        "  shape #{} {:?}{} bounds: [{}, {}, {}, {}]",
        idx,
        shape.name(),
        if shape.is_visible() { "" } else { " (hidden)" },
        bounds.origin.x,
        bounds.origin.y,
        bounds.size.width,
        bounds.size.height,
    )?;
    writeln!(
        output,
        "    fill: {} {:?}",
        paint_str(shape.fill()),
        shape.fill_rule()
    )?;

    let stroke = shape.stroke();
    if !stroke.paint.is_none() {
        writeln!(
            output,
            "    stroke: {} width: {} {:?} {:?} dashes: {:?}",
            paint_str(stroke.paint),
            stroke.width,
            stroke.line_cap,
            stroke.line_join,
            shape.dashes(),
        )?;
    }

    Ok(())
}

fn paint_str(paint: Paint) -> String {
    match paint.color() {
        Some(color) => format!(
            "#{:02X}{:02X}{:02X}{:02X}",
            color.r, color.g, color.b, color.a
        ),
        None => "none".to_string(),
    }
}
