//! GPU program assembly and export tests.

use curv_lang::gpu_program::{JsonShape, JSON_VERSION};
use curv_lang::{compile, BBox, Config, ErrorCode, ExportError, FragExport, GpuProgram, System};

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn system() -> System {
    System::new(Config::default()).unwrap_or_else(|e| panic!("prelude failed: {e}"))
}

fn gpu<'s>(sys: &'s System, src: &str) -> GpuProgram<'s> {
    let prog = compile(sys, "export.curv", src).unwrap_or_else(|errs| panic!("compile failed: {errs:#?}"));
    GpuProgram::from_program(&prog, &sys.config().frag).unwrap_or_else(|e| panic!("not exportable: {e}"))
}

fn json(program: &GpuProgram) -> String {
    let mut out = Vec::new();
    program.write_json(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

fn curv(program: &GpuProgram) -> String {
    let mut out = Vec::new();
    program.write_curv(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

// ─── Assembly ────────────────────────────────────────────────────────────────

#[test]
fn fresh_program_is_empty() {
    let sys = system();
    let prog = compile(&sys, "e.curv", "circle(1)").unwrap();
    let gpu = GpuProgram::new(&sys, "e.curv", prog.nub());
    assert!(!gpu.is_shape());
    assert!(!gpu.is_2d() && !gpu.is_3d());
    assert!(gpu.bbox().is_none());
    assert!(matches!(gpu.to_json(), Err(ExportError::NotAShape)));
    assert!(matches!(gpu.write_curv(Vec::new()), Err(ExportError::NotAShape)));
}

#[test]
fn recognize_reports_non_shapes_without_changing_the_program() {
    let sys = system();
    let prog = compile(&sys, "e.curv", "let x = 1; in [x, 2]").unwrap();
    let value = prog.eval().unwrap();
    let mut gpu = GpuProgram::new(&sys, "e.curv", prog.nub());
    assert!(!gpu.recognize(&value, &FragExport::default()).unwrap());
    assert!(!gpu.is_shape());
}

#[test]
fn malformed_shapes_are_errors() {
    let sys = system();
    let prog = compile(&sys, "e.curv", "{is_2d: true, bbox: 0, dist: p -> 0, colour: p -> [1, 1, 1]}").unwrap();
    let value = prog.eval().unwrap();
    let mut gpu = GpuProgram::new(&sys, "e.curv", prog.nub());
    assert_eq!(gpu.recognize(&value, &FragExport::default()).unwrap_err().code, ErrorCode::E007);
    assert!(!gpu.is_shape());
}

#[test]
fn non_shape_result_is_reported_at_the_nub() {
    let sys = system();
    let prog = compile(&sys, "e.curv", "let a = 1;\nin a + 1").unwrap();
    let err = GpuProgram::from_program(&prog, &FragExport::default()).err().unwrap();
    assert_eq!(err.code, ErrorCode::E006);
    assert_eq!(err.span.line, 2);
}

#[test]
fn evaluation_errors_pass_through() {
    let sys = system();
    let prog = compile(&sys, "e.curv", "circle(nope)").unwrap();
    let err = GpuProgram::from_program(&prog, &FragExport::default()).err().unwrap();
    assert_eq!(err.code, ErrorCode::E001);
}

// ─── JSON ────────────────────────────────────────────────────────────────────

#[test]
fn json_describes_the_shape() {
    let sys = system();
    let program = gpu(&sys, "circle(2)");
    let doc: JsonShape = serde_json::from_str(&json(&program)).unwrap();
    assert_eq!(doc.version, JSON_VERSION);
    assert!(doc.is_2d);
    assert!(!doc.is_3d);
    assert_eq!(doc.bbox, BBox::new(vec![-2.0, -2.0], vec![2.0, 2.0]));
    assert_eq!(doc.config, FragExport::default());
}

#[test]
fn json_carries_infinite_bounds() {
    let sys = system();
    let program = gpu(&sys, "{is_3d: true, bbox: [[-inf, -inf, -1], [inf, inf, 1]], dist: p -> p[2], colour: p -> [1, 1, 1]}");
    let text = json(&program);
    assert!(text.contains("\"-inf\""), "{text}");
    let doc: JsonShape = serde_json::from_str(&text).unwrap();
    assert_eq!(doc.bbox.max, vec![f64::INFINITY, f64::INFINITY, 1.0]);
}

#[test]
fn json_carries_export_options() {
    let sys = system();
    let prog = compile(&sys, "e.curv", "sphere(1)").unwrap();
    let opts = FragExport { aa: 4, taa: 2, fdur: 0.02, bg: [0.0, 0.0, 0.0] };
    let program = GpuProgram::from_program(&prog, &opts).unwrap();
    let doc: JsonShape = serde_json::from_str(&json(&program)).unwrap();
    assert_eq!(doc.config, opts);
    assert!(doc.is_3d);
}

// ─── Curv ────────────────────────────────────────────────────────────────────

#[test]
fn curv_export_is_a_record_literal() {
    let sys = system();
    let text = curv(&gpu(&sys, "circle(1)"));
    assert!(text.starts_with("{\n  is_2d: true,\n  is_3d: false,\n  bbox: [[-1, -1], [1, 1]],\n"), "{text}");
    assert!(text.ends_with("}\n"), "{text}");
}

#[test]
fn curv_export_evaluates_to_the_same_shape() {
    let sys = system();
    let sources = [
        "circle(1)",
        "translate([1, 2, 3], cube(2))",
        "union(square(1), translate([2, 0], circle(1)))",
        // `abs` is rebound here but used freely by the square's `dist`
        "let abs = 2; c = square(1); in {is_2d: true, bbox: [[-1, -1], [1, 1]], dist: p -> c.dist(p) * abs, colour: p -> [1, 1, 1]}",
        "let f = x -> abs(x); g = x -> max(x); in let abs = g; max = f; in \
         {is_2d: true, bbox: [[-1, -1], [1, 1]], dist: p -> abs([p[0], p[1]]) - max(p[2]), colour: p -> [1, 1, 1]}",
    ];
    for src in sources {
        let original = gpu(&sys, src);
        let text = curv(&original);
        let again = gpu(&sys, &text);
        assert_eq!(again.is_2d(), original.is_2d(), "{src}");
        assert_eq!(again.is_3d(), original.is_3d(), "{src}");
        assert_eq!(again.bbox(), original.bbox(), "{src}");

        let (a, b) = (original.vshape().unwrap(), again.vshape().unwrap());
        for p in [[0.0, 0.0, 0.0, 0.0], [1.5, -0.5, 0.25, 0.0], [3.0, 1.0, 2.0, 0.0]] {
            assert_eq!(a.dist_at(p).unwrap(), b.dist_at(p).unwrap(), "{src} at {p:?}");
            assert_eq!(a.colour_at(p).unwrap(), b.colour_at(p).unwrap(), "{src} at {p:?}");
        }
    }
}
