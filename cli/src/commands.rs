use std::io;
use std::path::PathBuf;

use vector_image::LoadOptions;

pub struct ShowCmd {
    pub input: PathBuf,
    pub options: LoadOptions,
    pub edges: bool,
    pub output: Box<dyn io::Write>,
}

pub struct TessellateCmd {
    pub input: PathBuf,
    pub options: LoadOptions,
    pub tolerance: f32,
    pub fill: bool,
    pub stroke: bool,
    pub output: Box<dyn io::Write>,
}
