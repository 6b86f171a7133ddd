use crate::document::{RawDocument, RawPaint, RawPath, RawShape, SHAPE_ID_LEN};
use crate::geom::euclid;
use crate::math::point;
use crate::*;

use std::ffi::CStr;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

static TEMP_FILES: AtomicUsize = AtomicUsize::new(0);

// Deletes the file when dropped.
struct TempFile(PathBuf);

impl TempFile {
    fn new(content: &[u8]) -> Self {
        let idx = TEMP_FILES.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "vector_image_test_{}_{}.svg",
            std::process::id(),
            idx
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content).unwrap();
        TempFile(path)
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

const SINGLE_EDGE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
  <path id="edge" d="M10 10 L90 50" fill="#3333F8" stroke="#000000"/>
</svg>"##;

const THREE_SHAPES: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
  <rect id="first" x="0" y="0" width="10" height="10" fill="red"/>
  <circle id="second" cx="50" cy="50" r="10" fill="lime"/>
  <path id="third" d="M0 90 L100 90 L100 100 Z" fill="blue"/>
</svg>"##;

#[test]
fn single_edge() {
    let file = TempFile::new(SINGLE_EDGE.as_bytes());
    let image = load_vector_image(&file.0).unwrap();

    assert_eq!(image.width(), 100.0);
    assert_eq!(image.height(), 100.0);
    assert_eq!(image.len(), 1);
    assert_eq!(image.num_paths(), 1);
    assert_eq!(image.num_edges(), 1);

    let shape = image.shape(0).unwrap();
    assert_eq!(shape.name(), "edge");
    assert!(shape.is_visible());
    assert_eq!(shape.opacity(), 1.0);
    assert_eq!(shape.fill(), Paint::Solid(Color::from_packed(0xFFF83333)));
    assert_eq!(shape.fill().color(), Some(Color::rgba(0x33, 0x33, 0xF8, 0xFF)));
    assert_eq!(shape.stroke().paint, Paint::Solid(Color::BLACK));
    let bounds: Rect = shape.bounds();
    assert_eq!(bounds, euclid::rect(10.0, 10.0, 80.0, 40.0));

    let mut paths: Paths = shape.paths();
    let path = paths.next().unwrap();
    assert!(paths.next().is_none());
    assert!(!path.is_closed());
    let edge = path.edges()[0];
    assert_eq!(edge.kind, CurveKind::Line);
    assert_eq!(edge.start, point(10.0, 10.0));
    assert_eq!(edge.end, point(90.0, 50.0));
}

#[test]
fn shapes_in_document_order() {
    let image = Loader::new()
        .load_from_memory(THREE_SHAPES.as_bytes())
        .unwrap();

    let names: Vec<&str> = image.shapes().map(|shape| shape.name()).collect();
    assert_eq!(names, vec!["first", "second", "third"]);

    let fills: Vec<Option<Color>> = image.shapes().map(|shape| shape.fill().color()).collect();
    assert_eq!(
        fills,
        vec![
            Some(Color::rgba(255, 0, 0, 255)),
            Some(Color::rgba(0, 255, 0, 255)),
            Some(Color::rgba(0, 0, 255, 255)),
        ]
    );

    for shape in &image {
        assert_eq!(shape.num_paths(), 1);
        assert!(shape.path(0).unwrap().is_closed());
    }

    // The circle is approximated with cubic curves.
    let circle = image.shape(1).unwrap();
    assert!(circle
        .path(0)
        .unwrap()
        .edges()
        .iter()
        .any(|edge| edge.kind == CurveKind::Cubic));
}

#[test]
fn missing_file() {
    let path = std::env::temp_dir().join("vector_image_test_does_not_exist.svg");
    match load_vector_image(&path) {
        Err(LoadError::FileOpen { path: err_path, .. }) => assert_eq!(err_path, path),
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn empty_file() {
    let file = TempFile::new(b"");
    assert!(matches!(
        load_vector_image(&file.0),
        Err(LoadError::EmptyFile)
    ));

    assert!(matches!(
        Loader::new().load_from_memory(b""),
        Err(LoadError::EmptyFile)
    ));
}

#[test]
fn invalid_file() {
    let file = TempFile::new(b"this is not an svg document");
    assert!(matches!(
        load_vector_image(&file.0),
        Err(LoadError::Parse(_))
    ));
}

#[test]
fn loader_is_reusable() {
    let mut loader = Loader::new();
    let a = loader.load_from_memory(SINGLE_EDGE.as_bytes()).unwrap();
    assert!(loader.load_from_memory(b"<svg").is_err());
    let b = loader.load_from_memory(THREE_SHAPES.as_bytes()).unwrap();
    let c = loader.load_from_memory(SINGLE_EDGE.as_bytes()).unwrap();

    assert_eq!(a.len(), 1);
    assert_eq!(b.len(), 3);
    assert_eq!(a, c);
}

#[test]
fn physical_units() {
    let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="192" height="96">
      <path d="M0 0 L96 0 L96 48 Z" fill="black"/>
    </svg>"##;

    let mut loader = Loader::new().with_options(LoadOptions::DEFAULT.with_units(Units::In));
    let image = loader.load_from_memory(svg.as_bytes()).unwrap();
    assert_eq!(image.width(), 2.0);
    assert_eq!(image.height(), 1.0);

    let bounds = image.shape(0).unwrap().bounds();
    assert_eq!(bounds.size.width, 1.0);
    assert_eq!(bounds.size.height, 0.5);

    // At 48 dpi, an inch is 48 pixels.
    loader.set_options(LoadOptions::dpi(48.0).with_units(Units::In));
    let image = loader.load_from_memory(svg.as_bytes()).unwrap();
    assert_eq!(image.width(), 4.0);
}

#[test]
fn invalid_resolution() {
    for dpi in [0.0, -72.0, f32::NAN] {
        let mut loader = Loader::new().with_options(LoadOptions::dpi(dpi).with_units(Units::Mm));
        assert!(matches!(
            loader.load_from_memory(SINGLE_EDGE.as_bytes()),
            Err(LoadError::InvalidResolution { .. })
        ));

        // Checked before touching the file system.
        assert!(matches!(
            loader.load("does/not/exist.svg"),
            Err(LoadError::InvalidResolution { .. })
        ));
    }

    // The parser refuses it as well when driven by another caller.
    let mut parser = UsvgParser::new();
    let text = std::ffi::CString::new(SINGLE_EDGE).unwrap();
    assert!(parser.parse(&text, Units::In, 0.0).is_err());
}

#[test]
fn blue_shape_asset() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets/blue_shape.svg");
    let image = load_vector_image(path).unwrap();

    assert_eq!(image.width(), 200.0);
    assert_eq!(image.height(), 120.0);

    let shape = image
        .shapes()
        .find(|shape| shape.name() == "blue_shape")
        .unwrap();
    assert_eq!(shape.fill(), Paint::Solid(Color::rgba(0x33, 0x33, 0xF8, 0xFF)));
    assert_eq!(shape.stroke().width, 2.0);
    assert_eq!(shape.stroke().line_join, LineJoin::Round);
    assert_eq!(shape.num_paths(), 1);

    let kinds: Vec<CurveKind> = shape.path(0).unwrap().edges().iter().map(|e| e.kind).collect();
    assert!(kinds.contains(&CurveKind::Line));
    assert!(kinds.iter().any(|kind| kind.is_quadratic()));
    assert!(kinds.contains(&CurveKind::Cubic));

    let dot = image.shapes().find(|shape| shape.name() == "dot").unwrap();
    assert_eq!(dot.fill().color().map(|c| c.a), Some(128));

    let dashes = image.shapes().find(|shape| shape.name() == "dashes").unwrap();
    assert_eq!(dashes.dashes(), &[6.0, 3.0]);
}

// Returns a canned document and records the text it was given.
struct FakeParser {
    document: RawDocument,
    seen: Vec<Vec<u8>>,
}

impl FakeParser {
    fn new(document: RawDocument) -> Self {
        FakeParser {
            document,
            seen: Vec::new(),
        }
    }
}

impl SvgParser for FakeParser {
    fn parse(&mut self, text: &CStr, _: Units, _: f32) -> Result<RawDocument, ParseError> {
        self.seen.push(text.to_bytes().to_vec());
        Ok(self.document.clone())
    }
}

fn line_shape(id: &str) -> RawShape {
    let mut shape = RawShape::new();
    shape.set_id(id);
    shape.fill = RawPaint::color(0xFF000000);
    shape.paths.push(RawPath {
        points: vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0],
        closed: false,
    });
    shape
}

#[test]
fn corrupt_shape_id() {
    let mut document = RawDocument::new(10.0, 10.0);
    document.shapes.push(line_shape("ok"));
    let mut corrupt = line_shape("");
    corrupt.id = [b'x'; SHAPE_ID_LEN];
    document.shapes.push(corrupt);

    let mut loader = Loader::with_parser(FakeParser::new(document));
    match loader.load_from_memory(b"<svg/>") {
        Err(LoadError::CorruptShapeId { shape }) => assert_eq!(shape, 1),
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn parser_input_is_nul_terminated() {
    let mut parser = FakeParser::new(RawDocument::new(1.0, 1.0));

    {
        let mut loader = Loader::with_parser(&mut parser);
        loader.load_from_memory(b"<svg/>").unwrap();
        loader.load_from_memory(b"abc\0def").unwrap();
    }

    assert_eq!(parser.seen, vec![b"<svg/>".to_vec(), b"abc".to_vec()]);
}

#[test]
fn image_outlives_the_loader() {
    let mut document = RawDocument::new(10.0, 10.0);
    document.shapes.push(line_shape("line"));

    let image = {
        let mut loader = Loader::with_parser(FakeParser::new(document));
        loader.load_from_memory(b"<svg/>").unwrap()
    };

    assert_eq!(image.shape(0).unwrap().name(), "line");
    assert_eq!(image.num_edges(), 1);
}
