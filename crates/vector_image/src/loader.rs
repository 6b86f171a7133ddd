use crate::error::{LoadError, ParseError};
use crate::image::VectorImage;
use crate::parser::{SvgParser, Units, UsvgParser};

use std::ffi::CStr;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Scratch memory kept by a [`Loader`] between two loads.
const RETAINED_SCRATCH_BYTES: usize = 64 * 1024;

/// Parameters for the SVG loader.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct LoadOptions {
    /// Resolution used to convert physical units. Must be positive.
    ///
    /// Default value: `LoadOptions::DEFAULT_DPI`.
    pub dpi: f32,

    /// Unit of the coordinates in the loaded image.
    ///
    /// Default value: `Units::Px`.
    pub units: Units,
}

impl LoadOptions {
    /// Default resolution.
    pub const DEFAULT_DPI: f32 = 96.0;

    pub const DEFAULT: Self = LoadOptions {
        dpi: Self::DEFAULT_DPI,
        units: Units::Px,
    };

    #[inline]
    pub const fn dpi(dpi: f32) -> Self {
        Self::DEFAULT.with_dpi(dpi)
    }

    #[inline]
    pub const fn with_dpi(mut self, dpi: f32) -> Self {
        self.dpi = dpi;
        self
    }

    #[inline]
    pub const fn with_units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Loads SVG files into [`VectorImage`]s.
///
/// The loader holds the parser, the options and a scratch buffer reused across
/// loads. It keeps no reference to the images it produces.
///
/// ```no_run
/// # extern crate vector_image;
/// # fn main() -> Result<(), vector_image::LoadError> {
/// use vector_image::{Loader, LoadOptions, Units};
///
/// let mut loader = Loader::new().with_options(LoadOptions::dpi(72.0).with_units(Units::Mm));
/// let logo = loader.load("logo.svg")?;
/// let icon = loader.load("icon.svgz")?;
/// # Ok(())
/// # }
/// ```
pub struct Loader<P = UsvgParser> {
    parser: P,
    options: LoadOptions,
    scratch: Vec<u8>,
}

impl Loader<UsvgParser> {
    pub fn new() -> Self {
        Loader::with_parser(UsvgParser::new())
    }
}

impl Default for Loader<UsvgParser> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: SvgParser> Loader<P> {
    /// Creates a loader using a custom parser.
    pub fn with_parser(parser: P) -> Self {
        Loader {
            parser,
            options: LoadOptions::DEFAULT,
            scratch: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    #[inline]
    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    #[inline]
    pub fn set_options(&mut self, options: LoadOptions) {
        self.options = options;
    }

    /// Reads, parses and converts an SVG file.
    pub fn load<F: AsRef<Path>>(&mut self, file_path: F) -> Result<VectorImage, LoadError> {
        let file_path = file_path.as_ref();
        log::debug!("Loading {:?}", file_path);

        self.check_options()?;

        let mut file = File::open(file_path).map_err(|source| LoadError::FileOpen {
            path: file_path.to_path_buf(),
            source,
        })?;

        let size = file
            .metadata()
            .map_err(|source| LoadError::FileRead {
                path: file_path.to_path_buf(),
                source,
            })?
            .len();

        if size == 0 {
            return Err(LoadError::EmptyFile);
        }

        self.scratch.clear();
        self.scratch.reserve(size as usize + 1);
        let read = file.read_to_end(&mut self.scratch);
        drop(file);

        if let Err(source) = read {
            self.release_scratch();
            return Err(LoadError::FileRead {
                path: file_path.to_path_buf(),
                source,
            });
        }

        self.parse_scratch()
    }

    /// Parses and converts an SVG document that is already in memory.
    pub fn load_from_memory(&mut self, data: &[u8]) -> Result<VectorImage, LoadError> {
        self.check_options()?;

        if data.is_empty() {
            return Err(LoadError::EmptyFile);
        }

        self.scratch.clear();
        self.scratch.reserve(data.len() + 1);
        self.scratch.extend_from_slice(data);

        self.parse_scratch()
    }

    fn check_options(&self) -> Result<(), LoadError> {
        let dpi = self.options.dpi;
        if !(dpi.is_finite() && dpi > 0.0) {
            return Err(LoadError::InvalidResolution { dpi });
        }

        Ok(())
    }

    fn parse_scratch(&mut self) -> Result<VectorImage, LoadError> {
        self.scratch.push(0);

        // The parser sees the text up to the first NUL byte.
        let result = match CStr::from_bytes_until_nul(&self.scratch) {
            Ok(text) => self
                .parser
                .parse(text, self.options.units, self.options.dpi)
                .map_err(LoadError::from),
            Err(_) => Err(ParseError::new("Missing NUL terminator").into()),
        };

        // The parsed document is dropped here, before returning.
        let result = result.and_then(|document| VectorImage::from_document(&document));

        self.release_scratch();

        result
    }

    fn release_scratch(&mut self) {
        self.scratch.clear();
        self.scratch.shrink_to(RETAINED_SCRATCH_BYTES);
    }
}

/// Loads an SVG file with the default options.
///
/// Shorthand for `Loader::new().load(path)`.
pub fn load_vector_image<F: AsRef<Path>>(path: F) -> Result<VectorImage, LoadError> {
    Loader::new().load(path)
}

#[test]
fn options() {
    assert_eq!(LoadOptions::default(), LoadOptions::DEFAULT);
    assert_eq!(LoadOptions::DEFAULT.dpi, 96.0);
    assert_eq!(LoadOptions::DEFAULT.units, Units::Px);

    let options = LoadOptions::dpi(300.0).with_units(Units::Mm);
    assert_eq!(options.dpi, 300.0);
    assert_eq!(options.units, Units::Mm);

    let loader = Loader::new().with_options(options);
    assert_eq!(*loader.options(), options);
}
