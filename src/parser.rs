// src/parser.rs
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{Result, ScaffoldError};
use crate::model::{Attributes, GroupNode, LeafNode, RouteNode};

/// 子ノードを格納するキー
const CHILDREN_KEY: &str = "urls";

/// 解釈するキーの一覧 (これ以外は読み飛ばす)
const KNOWN_KEYS: &[&str] = &[
    CHILDREN_KEY,
    "prefix",
    "layout",
    "module",
    "filter",
    "type",
    "url",
    "action",
    "comment",
];

/// module / action はファイル名と関数名になるため識別子に限定する
static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern"));

/// ルート宣言ファイル (JSON) を読み込み、ツリーとして返す
pub fn parse_routes_in_file(file_path: &Path) -> Result<RouteNode> {
    debug!(path = %file_path.display(), "loading route declaration");

    let src = fs::read_to_string(file_path)
        .map_err(|e| ScaffoldError::io("read route declaration", file_path, e))?;
    let value: Value = serde_json::from_str(&src).map_err(|e| ScaffoldError::Json {
        path: file_path.to_path_buf(),
        source: e,
    })?;

    parse_route_tree(&value)
}

/// デシリアライズ済みの JSON 値をルートツリーに変換する。
/// ルート自身も 1 つのノードとして扱う。
pub fn parse_route_tree(value: &Value) -> Result<RouteNode> {
    parse_node(value, "<root>")
}

fn parse_node(value: &Value, location: &str) -> Result<RouteNode> {
    let Value::Object(obj) = value else {
        return Err(malformed(location, "expected an object"));
    };

    for key in obj.keys().filter(|k| !KNOWN_KEYS.contains(&k.as_str())) {
        debug!(location, key = %key, "ignoring unknown route key");
    }

    let attributes = Attributes {
        layout: string_field(obj, "layout", location)?,
        module: string_field(obj, "module", location)?,
        filter: string_field(obj, "filter", location)?,
        kind: string_field(obj, "type", location)?,
    };
    if let Some(module) = &attributes.module {
        validate_name("module", module, location)?;
    }

    // 1) `urls` があればグループ (他のフィールドに関係なく)
    match obj.get(CHILDREN_KEY) {
        Some(Value::Array(items)) => {
            if obj.contains_key("action") || obj.contains_key("url") {
                warn!(location, "group node also declares url/action; they are ignored");
            }

            let children = items
                .iter()
                .enumerate()
                .map(|(i, child)| parse_node(child, &child_location(location, i)))
                .collect::<Result<Vec<_>>>()?;

            Ok(RouteNode::Group(GroupNode {
                prefix: string_field(obj, "prefix", location)?,
                attributes,
                children,
            }))
        }
        Some(Value::Null) | None => {
            // 2) それ以外はリーフ。action と url が必須
            let action = string_field(obj, "action", location)?
                .ok_or_else(|| malformed(location, "leaf has no `action`"))?;
            if action.is_empty() {
                return Err(malformed(location, "leaf has an empty `action`"));
            }
            validate_name("action", &action, location)?;

            let url = string_field(obj, "url", location)?
                .ok_or_else(|| malformed(location, "leaf has no `url`"))?;

            if obj.contains_key("prefix") {
                debug!(location, "prefix on a leaf node has no effect");
            }

            Ok(RouteNode::Leaf(LeafNode {
                url,
                action,
                comment: string_field(obj, "comment", location)?,
                attributes,
            }))
        }
        Some(_) => Err(malformed(location, "`urls` must be an array")),
    }
}

/// 文字列フィールドを取り出す。`null` は未定義として扱う
fn string_field(obj: &Map<String, Value>, key: &str, location: &str) -> Result<Option<String>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(malformed(
            location,
            format!("`{key}` must be a string, found {other}"),
        )),
    }
}

fn validate_name(kind: &'static str, name: &str, location: &str) -> Result<()> {
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(ScaffoldError::InvalidName {
            kind,
            name: name.to_string(),
            location: location.to_string(),
        })
    }
}

fn child_location(parent: &str, index: usize) -> String {
    if parent == "<root>" {
        format!("{CHILDREN_KEY}[{index}]")
    } else {
        format!("{parent}.{CHILDREN_KEY}[{index}]")
    }
}

fn malformed(location: &str, reason: impl Into<String>) -> ScaffoldError {
    ScaffoldError::Malformed {
        location: location.to_string(),
        reason: reason.into(),
    }
}
