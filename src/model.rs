// src/model.rs
use serde::{Deserialize, Serialize};

/// JSON レスポンスを表す `type` の値
pub const JSON_TYPE: &str = "json";

/// 親から子へ継承される属性 (layout / module / filter / type)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    pub layout: Option<String>,
    pub module: Option<String>,
    pub filter: Option<String>,
    pub kind: Option<String>,
}

impl Attributes {
    /// まだ値を持たない属性だけを `parent` の値で埋める。
    /// 葉に近い側で定義済みの値は上書きしない。
    pub fn fill_from(&mut self, parent: &Attributes) {
        fill(&mut self.layout, &parent.layout);
        fill(&mut self.module, &parent.module);
        fill(&mut self.filter, &parent.filter);
        fill(&mut self.kind, &parent.kind);
    }
}

fn fill(slot: &mut Option<String>, parent: &Option<String>) {
    if slot.is_none() {
        slot.clone_from(parent);
    }
}

/// ルート宣言ツリーの 1 ノード
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteNode {
    Group(GroupNode),
    Leaf(LeafNode),
}

/// `urls` を持つノード。接頭辞と属性を子孫へ伝える
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupNode {
    pub prefix: Option<String>,
    pub attributes: Attributes,
    pub children: Vec<RouteNode>,
}

/// 実際にアクセス可能なエンドポイント
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeafNode {
    /// 祖先の接頭辞を付ける前の URL 断片
    pub url: String,
    pub action: String,
    pub comment: Option<String>,
    pub attributes: Attributes,
}

/// 解決途中のルート (URL はまだ一部の接頭辞しか付いていない)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRecord {
    pub url: String,
    pub action: String,
    pub comment: Option<String>,
    pub attributes: Attributes,
}

impl From<&LeafNode> for RouteRecord {
    fn from(leaf: &LeafNode) -> Self {
        RouteRecord {
            url: leaf.url.clone(),
            action: leaf.action.clone(),
            comment: leaf.comment.clone(),
            attributes: leaf.attributes.clone(),
        }
    }
}

/// 完全に解決されたルート。キャッシュにはこの形で保存する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRoute {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    pub module: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl ResolvedRoute {
    pub fn is_json(&self) -> bool {
        self.kind.as_deref() == Some(JSON_TYPE)
    }
}

/// 宣言順 (深さ優先) に並んだ解決済みルート
pub type RouteTable = Vec<ResolvedRoute>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn attrs(layout: Option<&str>, module: Option<&str>) -> Attributes {
        Attributes {
            layout: layout.map(String::from),
            module: module.map(String::from),
            ..Attributes::default()
        }
    }

    #[test]
    fn fill_from_keeps_nearer_values() {
        let mut child = attrs(Some("minimal"), None);
        child.fill_from(&attrs(Some("main"), Some("user")));
        assert_eq!(child, attrs(Some("minimal"), Some("user")));
    }

    #[test]
    fn resolved_route_omits_null_keys() {
        let route = ResolvedRoute {
            url: "/api/detail".into(),
            layout: None,
            module: "user".into(),
            filter: None,
            kind: None,
            action: "detail".into(),
            comment: None,
        };
        let json = serde_json::to_value(&route).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"url": "/api/detail", "module": "user", "action": "detail"})
        );
    }

    #[test]
    fn resolved_route_serializes_type_key() {
        let route = ResolvedRoute {
            url: "/api/list".into(),
            layout: None,
            module: "user".into(),
            filter: None,
            kind: Some("json".into()),
            action: "list".into(),
            comment: None,
        };
        let text = serde_json::to_string(&route).unwrap();
        assert_eq!(
            text,
            r#"{"url":"/api/list","module":"user","type":"json","action":"list"}"#
        );
        assert!(route.is_json());
    }
}
