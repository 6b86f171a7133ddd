use crate::commands::TessellateCmd;
use crate::CliError;

use std::io::Write;

use vector_image::math::{Point, Transform};
use vector_image::path::Path;
use vector_image::tessellation::geometry_builder::{simple_builder, VertexBuffers};
use vector_image::tessellation::{FillOptions, FillTessellator, StrokeOptions, StrokeTessellator};
use vector_image::{render_vector_image, Color, Loader, Renderer};

// Tessellates everything into one set of buffers.
struct Tessellator {
    fill_tess: FillTessellator,
    stroke_tess: StrokeTessellator,
    buffers: VertexBuffers<Point, u16>,
    tolerance: f32,
    fill: bool,
    stroke: bool,
    fills: usize,
    strokes: usize,
    errors: usize,
}

impl Renderer for Tessellator {
    fn fill_path(&mut self, path: &Path, _color: Color, options: &FillOptions) {
        if !self.fill {
            return;
        }
        let options = options.with_tolerance(self.tolerance);
        let result = self.fill_tess.tessellate_path(
            path,
            &options,
            &mut simple_builder(&mut self.buffers),
        );
        match result {
            Ok(()) => self.fills += 1,
            Err(err) => {
                log::warn!("Fill tessellation failed: {:?}", err);
                self.errors += 1;
            }
        }
    }

    fn stroke_path(&mut self, path: &Path, _color: Color, options: &StrokeOptions) {
        if !self.stroke {
            return;
        }
        let options = options.with_tolerance(self.tolerance);
        let result = self.stroke_tess.tessellate_path(
            path,
            &options,
            &mut simple_builder(&mut self.buffers),
        );
        match result {
            Ok(()) => self.strokes += 1,
            Err(err) => {
                log::warn!("Stroke tessellation failed: {:?}", err);
                self.errors += 1;
            }
        }
    }
}

pub fn tessellate(mut cmd: TessellateCmd) -> Result<(), CliError> {
    let image = Loader::new()
        .with_options(cmd.options)
        .load(&cmd.input)?;

    let mut tessellator = Tessellator {
        fill_tess: FillTessellator::new(),
        stroke_tess: StrokeTessellator::new(),
        buffers: VertexBuffers::new(),
        tolerance: cmd.tolerance,
        fill: cmd.fill,
        stroke: cmd.stroke,
        fills: 0,
        strokes: 0,
        errors: 0,
    };

    render_vector_image(&image, &Transform::identity(), &mut tessellator);

    let output = &mut *cmd.output;
    writeln!(output, "fills: {}", tessellator.fills)?;
    writeln!(output, "strokes: {}", tessellator.strokes)?;
    writeln!(output, "vertices: {}", tessellator.buffers.vertices.len())?;
    writeln!(output, "indices: {}", tessellator.buffers.indices.len())?;
    writeln!(output, "triangles: {}", tessellator.buffers.indices.len() / 3)?;

    if tessellator.errors > 0 {
        return Err(CliError::Tessellation(tessellator.errors));
    }

    Ok(())
}
