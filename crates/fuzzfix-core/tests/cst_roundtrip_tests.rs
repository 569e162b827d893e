//! Lossless round-trip coverage for the C syntax tree
//!
//! Every input, well-formed or not, must print back byte for byte.

use fuzzfix_core::cst::{CSyntaxKind, parse_c};

fn assert_roundtrip(source: &str) {
    let parse = parse_c(source);
    assert_eq!(
        parse.syntax().text().to_string(),
        source,
        "round-trip failed, errors: {:?}",
        parse.errors()
    );
}

#[test]
fn test_roundtrip_well_formed_units() {
    let sources = [
        "",
        "\n\n",
        "int main(void) { return 0; }\n",
        "#include <stdio.h>\n#define MAX(a, b) ((a) > (b) ? (a) : (b))\nint f(int a) {\n  /* block */ if (a > MAX(1, 2)) { puts(\"{ not a brace }\"); }\n  // line\n  return a;\n}\n",
        "void f(int c) {\r\n  switch (c) {\r\n  case 'a': if (c) g(); break;\r\n  default: ;\r\n  }\r\n}\r\n",
        "void f() {\n\tfor (;;) {\n\t\tif (done()) break;\n\t}\n\tdo { x++; } while (x < 3);\n}\n",
        "struct point { int x, y; };\ntypedef struct point point_t;\nstatic const char *names[] = { \"a\", \"b\" };\n",
    ];
    for source in sources {
        assert!(!parse_c(source).has_errors(), "unexpected errors in {source:?}");
        assert_roundtrip(source);
    }
}

#[test]
fn test_roundtrip_malformed_units() {
    let sources = [
        "int main() { if (a) {\n",
        "void f() { x(); else y(); }",
        "void f() { g(a]; }",
        "int main() {\n  if (x {\n}\n",
        "}}}",
    ];
    for source in sources {
        assert!(parse_c(source).has_errors(), "expected errors in {source:?}");
        assert_roundtrip(source);
    }
}

#[test]
fn test_directive_lines_are_trivia() {
    let parse = parse_c("  #if DEBUG\nint x;\n  #endif\n");
    let root = parse.syntax();
    let directives = root
        .descendants_with_tokens()
        .filter(|e| e.kind() == CSyntaxKind::Preprocessor)
        .count();
    assert_eq!(directives, 2);
}
