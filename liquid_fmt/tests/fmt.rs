use insta::{Settings, assert_snapshot, glob};
use liquid_fmt::{
    FormatError, Hints, ParseError,
    ast::RawKind,
    config::{FormatOptions, WhitespaceSensitivity},
    format_text, is_liquid_path,
};
use std::{borrow::Cow, collections::HashMap, fs, path::Path};

fn identity(code: &str, _: Hints) -> Result<Cow<'_, str>, ()> {
    Ok(code.into())
}

/// Format, then check that formatting the output again changes nothing.
fn run_format_test(input: &str, options: &FormatOptions) -> String {
    let output = format_text(input, options, identity)
        .map_err(|err| format!("failed to format '{input}': {err:?}"))
        .unwrap();
    let regression_format = format_text(&output, options, identity)
        .map_err(|err| format!("syntax error in stability test '{output}': {err:?}"))
        .unwrap();
    similar_asserts::assert_eq!(output, regression_format, "'{input}' format is unstable");
    output
}

fn format(input: &str) -> String {
    run_format_test(input, &Default::default())
}

fn format_with_width(input: &str, print_width: usize) -> String {
    let mut options = FormatOptions::default();
    options.layout.print_width = print_width;
    run_format_test(input, &options)
}

#[test]
fn fmt_snapshot() {
    glob!("fmt/**/*.liquid", |path| {
        let input = fs::read_to_string(path).unwrap();
        let name = path.file_stem().unwrap().to_str().unwrap();

        if let Some(options) = fixture_options(path) {
            options.into_iter().for_each(|(option_name, options)| {
                let output = run_format_test(&input, &options);
                build_settings(path).bind(|| {
                    assert_snapshot!(format!("{name}.{option_name}"), output);
                });
            })
        } else {
            let output = run_format_test(&input, &Default::default());
            build_settings(path).bind(|| {
                assert_snapshot!(name, output);
            });
        }
    });
}

/// Named option sets from a `config.toml` next to the fixture.
#[cfg(feature = "config_serde")]
fn fixture_options(path: &Path) -> Option<HashMap<String, FormatOptions>> {
    fs::read_to_string(path.with_file_name("config.toml"))
        .map(|config_file| toml::from_str(&config_file).unwrap())
        .ok()
}

/// Options can't be deserialized, so fixtures with a `config.toml` are skipped.
#[cfg(not(feature = "config_serde"))]
fn fixture_options(path: &Path) -> Option<HashMap<String, FormatOptions>> {
    path.with_file_name("config.toml").exists().then(HashMap::new)
}

fn build_settings(path: &Path) -> Settings {
    let mut settings = Settings::clone_current();
    settings.set_snapshot_path(path.parent().unwrap());
    settings.remove_snapshot_suffix();
    settings.set_prepend_module_to_snapshot(false);
    settings.remove_input_file();
    settings.set_omit_expression(true);
    settings.remove_info();
    settings
}

#[test]
fn drops() {
    similar_asserts::assert_eq!(format("{{x}}"), "{{ x }}\n");
    similar_asserts::assert_eq!(
        format("{{ product.title|upcase|truncate:10,'...' }}"),
        "{{ product.title | upcase | truncate: 10, \"...\" }}\n"
    );
    similar_asserts::assert_eq!(format("{{-x-}}"), "{{- x -}}\n");
}

#[test]
fn tags() {
    similar_asserts::assert_eq!(
        format("{%if a%}b{%endif%}"),
        "{% if a %}b{% endif %}\n"
    );
    similar_asserts::assert_eq!(
        format("{%- assign x = 'a' | append: b -%}"),
        "{%- assign x = \"a\" | append: b -%}\n"
    );
}

#[test]
fn liquid_tag_lines() {
    similar_asserts::assert_eq!(
        format("{% liquid\nassign a = 1\nif a\necho a\nendif\n%}"),
        "{% liquid\n  assign a = 1\n  if a\n    echo a\n  endif\n%}\n"
    );
}

#[test]
fn trim_markers_are_added_when_breaking() {
    similar_asserts::assert_eq!(
        format_with_width("{% if a %}<b>x</b>{% endif %}", 10),
        "{% if a -%}\n  <b>x</b>\n{%- endif %}\n"
    );
}

#[test]
fn ignore_mode_keeps_branch_text_glued() {
    let mut options = FormatOptions::default();
    options.layout.print_width = 8;
    options.language.whitespace_sensitivity = WhitespaceSensitivity::Ignore;
    similar_asserts::assert_eq!(
        run_format_test("{% if a %}xxxxxxxx{% endif %}", &options),
        "{% if a -%}\n  xxxxxxxx\n{%- endif %}\n"
    );
}

#[test]
fn case_is_always_broken() {
    let output = format("{% case a %}{% when 1 %}one{% when 2 %}two{% endcase %}");
    assert!(output.starts_with("{% case a %}\n"));
    assert!(output.ends_with("{%- endcase %}\n"));
}

#[test]
fn elements() {
    similar_asserts::assert_eq!(format("<DIV class='a'>x</DIV>"), "<div class=\"a\">x</div>\n");
    similar_asserts::assert_eq!(
        format("<div><p>a</p><p>b</p></div>"),
        "<div>\n  <p>a</p>\n  <p>b</p>\n</div>\n"
    );
    similar_asserts::assert_eq!(format("<my-Element></my-Element>"), "<my-Element></my-Element>\n");
    similar_asserts::assert_eq!(format("<br/><br>"), "<br /><br>\n");
}

#[test]
fn blank_lines_collapse() {
    similar_asserts::assert_eq!(
        format("<p>a</p>\n\n\n\n<p>b</p>"),
        "<p>a</p>\n\n<p>b</p>\n"
    );
}

#[test]
fn attribute_quotes() {
    similar_asserts::assert_eq!(
        format("<a title='say \"hi\"'>x</a>"),
        "<a title='say \"hi\"'>x</a>\n"
    );
    similar_asserts::assert_eq!(
        format("<a title='it&#x27;s'>x</a>"),
        "<a title=\"it's\">x</a>\n"
    );
    similar_asserts::assert_eq!(
        format("<div class=\"{{ a | append: 'b' }}\"></div>"),
        "<div class=\"{{ a | append: 'b' }}\"></div>\n"
    );
}

#[test]
fn single_attribute_per_line() {
    let mut options = FormatOptions::default();
    options.language.single_attribute_per_line = true;
    similar_asserts::assert_eq!(
        run_format_test("<img src=\"a\" alt=\"b\">", &options),
        "<img\n  src=\"a\"\n  alt=\"b\"\n>\n"
    );
}

#[test]
fn whitespace_sensitivity_modes() {
    for sensitivity in [
        WhitespaceSensitivity::Css,
        WhitespaceSensitivity::Strict,
        WhitespaceSensitivity::Ignore,
    ] {
        let mut options = FormatOptions::default();
        options.language.whitespace_sensitivity = sensitivity;
        run_format_test("<div><span>a</span> <span>b</span></div>", &options);
    }
}

#[test]
fn embedded_code() {
    let mut kinds = vec![];
    let output = format_text(
        "<script>\n    var a = 1;\n</script>\n{% schema %}{\"a\": 1}{% endschema %}",
        &FormatOptions::default(),
        |code, hints| {
            kinds.push(hints.kind);
            Ok::<_, ()>(Cow::from(code))
        },
    )
    .unwrap();
    assert_eq!(kinds, [RawKind::Javascript, RawKind::Json]);
    similar_asserts::assert_eq!(
        output,
        "<script>\n  var a = 1;\n</script>\n{% schema %}\n  {\"a\": 1}\n{% endschema %}\n"
    );
}

#[test]
fn external_formatter_error() {
    let result = format_text("<style>a{}</style>", &FormatOptions::default(), |_, _| Err("boom"));
    assert!(matches!(result, Err(FormatError::External("boom"))));
}

#[test]
fn syntax_errors() {
    let result = format_text("<a><div></a>", &FormatOptions::default(), identity);
    assert!(matches!(
        result,
        Err(FormatError::Syntax(ParseError::Structural(..)))
    ));
    let result = format_text("{% if a %}b", &FormatOptions::default(), identity);
    assert!(matches!(
        result,
        Err(FormatError::Syntax(ParseError::Structural(..)))
    ));
}

#[test]
fn ignore_directives() {
    let source = "<!-- liquid-fmt-ignore-file -->\n<div   >{{x}}</div>";
    similar_asserts::assert_eq!(
        format_text(source, &FormatOptions::default(), identity).unwrap(),
        source
    );
    similar_asserts::assert_eq!(
        format("<!-- liquid-fmt-ignore -->\n<div   class='a'>x</div>\n<p>{{y}}</p>"),
        "<!-- liquid-fmt-ignore -->\n<div   class='a'>x</div>\n<p>{{ y }}</p>\n"
    );
}

#[test]
fn liquid_paths() {
    assert!(is_liquid_path(Path::new("sections/header.liquid")));
    assert!(!is_liquid_path("index.html"));
}

#[cfg(feature = "config_serde")]
#[test]
fn options_from_toml() {
    let options = toml::from_str::<FormatOptions>(
        "printWidth = 100\nsingleAttributePerLine = true\nwhitespaceSensitivity = \"ignore\"",
    )
    .unwrap();
    assert_eq!(options.layout.print_width, 100);
    assert!(options.language.single_attribute_per_line);
    assert_eq!(
        options.language.whitespace_sensitivity,
        WhitespaceSensitivity::Ignore
    );
}
