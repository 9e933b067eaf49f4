// src/stub.rs
use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::ResolvedRoute;

/// ハンドラ名の接頭辞
pub const HANDLER_PREFIX: &str = "execute";

/// 新規コントローラの中身
pub const CONTROLLER_HEADER: &str = "<?php\n";

/// コントローラ / テンプレートの拡張子
pub const SOURCE_EXTENSION: &str = "php";

static FUNCTION_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(?:(?:public|protected|private|static|final|abstract)\s+)*function\s+&?\s*([A-Za-z_][A-Za-z0-9_]*)\s*\(")
        .expect("function declaration pattern")
});

/// `list` → `executeList`
pub fn handler_name(action: &str) -> String {
    let mut chars = action.chars();
    match chars.next() {
        Some(first) => format!("{HANDLER_PREFIX}{}{}", first.to_uppercase(), chars.as_str()),
        None => HANDLER_PREFIX.to_string(),
    }
}

/// コントローラのソースから宣言済みの関数名を集める (実行はしない)。
/// 関数名は大文字小文字を区別せずに解決されるので、小文字で保持する。
#[derive(Debug, Default, Clone)]
pub struct DeclaredSymbols {
    names: HashSet<String>,
}

impl DeclaredSymbols {
    pub fn scan(source: &str) -> Self {
        let code = blank_comments_and_strings(source);
        let names = FUNCTION_DECL
            .captures_iter(&code)
            .map(|caps| caps[1].to_ascii_lowercase())
            .collect();
        DeclaredSymbols { names }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name.to_ascii_lowercase())
    }

    pub fn insert(&mut self, name: &str) {
        self.names.insert(name.to_ascii_lowercase());
    }
}

/// コメントと文字列リテラルを空白に置き換える。
/// 改行は残すので、行頭アンカーの位置は変わらない。
fn blank_comments_and_strings(source: &str) -> String {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum State {
        Code,
        LineComment,
        BlockComment,
        Quoted(char),
    }

    let mut out = String::with_capacity(source.len());
    let mut state = State::Code;
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Code => match c {
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    state = State::LineComment;
                    out.push_str("  ");
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = State::BlockComment;
                    out.push_str("  ");
                }
                // `#[` は属性なのでコメントではない
                '#' if chars.peek() != Some(&'[') => {
                    state = State::LineComment;
                    out.push(' ');
                }
                '\'' | '"' => {
                    state = State::Quoted(c);
                    out.push(' ');
                }
                _ => out.push(c),
            },
            State::LineComment => {
                if c == '\n' {
                    state = State::Code;
                    out.push(c);
                } else {
                    out.push(' ');
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = State::Code;
                    out.push_str("  ");
                } else {
                    out.push(if c == '\n' { c } else { ' ' });
                }
            }
            State::Quoted(quote) => {
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        out.push(' ');
                        out.push(if escaped == '\n' { escaped } else { ' ' });
                        continue;
                    }
                } else if c == quote {
                    state = State::Code;
                }
                out.push(if c == '\n' { c } else { ' ' });
            }
        }
    }
    out
}

/// ルート 1 件分のハンドラ雛形を組み立てる
pub fn handler_stub(route: &ResolvedRoute) -> String {
    let comment = route.comment.as_deref().unwrap_or("");
    let mut stub = String::new();
    stub.push_str("\n/*\n");
    for line in comment.lines().chain(comment.is_empty().then_some("")) {
        stub.push_str(" * ");
        // コメント中の `*/` でブロックが閉じないようにする
        stub.push_str(&line.replace("*/", "*\\/"));
        stub.push('\n');
    }
    stub.push_str(" */\n");
    stub.push_str(&format!(
        "function {}($req, $t){{\n",
        handler_name(&route.action)
    ));
    if route.is_json() {
        stub.push_str("  $t->setLayout(false);\n");
        stub.push_str("  $t->setJson(true);\n\n");
    }
    stub.push_str("  $t->process();\n}\n");
    stub
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn route(action: &str, kind: Option<&str>, comment: Option<&str>) -> ResolvedRoute {
        ResolvedRoute {
            url: format!("/{action}"),
            layout: None,
            module: "user".into(),
            filter: None,
            kind: kind.map(String::from),
            action: action.into(),
            comment: comment.map(String::from),
        }
    }

    #[rstest]
    #[case("list", "executeList")]
    #[case("getUser", "executeGetUser")]
    #[case("_internal", "execute_internal")]
    #[case("x", "executeX")]
    fn derives_handler_names(#[case] action: &str, #[case] expected: &str) {
        assert_eq!(handler_name(action), expected);
    }

    #[test]
    fn json_stub_disables_layout_before_processing() {
        let stub = handler_stub(&route("list", Some("json"), Some("List users")));
        assert_eq!(
            stub,
            "\n/*\n * List users\n */\nfunction executeList($req, $t){\n  $t->setLayout(false);\n  $t->setJson(true);\n\n  $t->process();\n}\n"
        );
    }

    #[test]
    fn plain_stub_only_processes() {
        let stub = handler_stub(&route("detail", None, None));
        assert_eq!(
            stub,
            "\n/*\n * \n */\nfunction executeDetail($req, $t){\n  $t->process();\n}\n"
        );
    }

    #[test]
    fn non_json_type_is_treated_as_page() {
        let stub = handler_stub(&route("feed", Some("xml"), None));
        assert!(!stub.contains("setJson"));
    }

    #[test]
    fn scan_finds_declarations_case_insensitively() {
        let source = "<?php\n\
            /* function executeCommented( */\n\
            function executeList($req, $t){\n  $t->process();\n}\n\
            \tpublic static function &executeRef ($req) {}\n\
            $x = 'call executeOther($y)';\n";
        let symbols = DeclaredSymbols::scan(source);

        assert!(symbols.contains("executeList"));
        assert!(symbols.contains("EXECUTELIST"));
        assert!(symbols.contains("executeRef"));
        assert!(!symbols.contains("executeOther"));
        assert!(!symbols.contains("executeCommented"));
    }

    #[test]
    fn scan_ignores_functions_inside_comments_and_strings() {
        let source = r#"<?php
/*
function executeList($req, $t){
  $t->process();
}
*/
// function executeLine($req, $t){}
# function executeHash($req, $t){}
$doc = "
function executeQuoted($req){}
";
$esc = 'it\'s
function executeEscaped($req){}';
#[Attribute]
function executeLive($req, $t){
  $t->process(); // function executeTrailing(
}
"#;
        let symbols = DeclaredSymbols::scan(source);

        assert!(symbols.contains("executeLive"));
        for hidden in [
            "executeList",
            "executeLine",
            "executeHash",
            "executeQuoted",
            "executeEscaped",
            "executeTrailing",
        ] {
            assert!(!symbols.contains(hidden), "{hidden} should not be declared");
        }
    }

    #[test]
    fn comment_terminator_is_escaped_in_stub() {
        let stub = handler_stub(&route("list", None, Some("ends early */ echo 1;")));
        assert!(stub.contains(" * ends early *\\/ echo 1;\n"));
        assert_eq!(stub.matches("*/").count(), 1);
    }
}
