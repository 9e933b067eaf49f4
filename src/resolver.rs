// src/resolver.rs
use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::{Result, ScaffoldError};
use crate::model::{ResolvedRoute, RouteNode, RouteRecord, RouteTable};

/// 1 つのノード配下を再帰的に平坦化する。
///
/// 戻り値の URL には `node` 自身より下の接頭辞しか付いていない。
/// 親へ戻るたびに、その親の接頭辞を前に足し、未定義の属性だけを埋める。
/// そのため葉に最も近い定義が常に優先される。
pub fn resolve_node(node: &RouteNode) -> Vec<RouteRecord> {
    match node {
        // 1) リーフはそのままコピーして返す
        RouteNode::Leaf(leaf) => vec![RouteRecord::from(leaf)],

        // 2) グループは子を宣言順に解決して連結し、自分の接頭辞と属性を適用する
        RouteNode::Group(group) => {
            let mut records: Vec<RouteRecord> =
                group.children.iter().flat_map(resolve_node).collect();

            let prefix = group.prefix.as_deref().unwrap_or("");
            for record in &mut records {
                record.url.insert_str(0, prefix);
                record.attributes.fill_from(&group.attributes);
            }
            records
        }
    }
}

/// ルートツリー全体を解決済みのルート表に変換する。
/// 最後まで module が決まらないリーフがあればエラーにする。
pub fn resolve_route_table(root: &RouteNode) -> Result<RouteTable> {
    let table = resolve_node(root)
        .into_iter()
        .map(finish_record)
        .collect::<Result<RouteTable>>()?;

    debug!(routes = table.len(), "route tree resolved");
    Ok(table)
}

/// 途中レコードを確定させる。値が `None` の属性はシリアライズ時に落ちる
fn finish_record(record: RouteRecord) -> Result<ResolvedRoute> {
    let RouteRecord {
        url,
        action,
        comment,
        attributes,
    } = record;

    let Some(module) = attributes.module else {
        return Err(ScaffoldError::MissingModule { url, action });
    };

    Ok(ResolvedRoute {
        url,
        layout: attributes.layout,
        module,
        filter: attributes.filter,
        kind: attributes.kind,
        action,
        comment,
    })
}

/// 複数のリーフで宣言された URL を、その URL を持つ action の一覧と共に返す。
/// 表そのものは変更しない (キーで引く側では後勝ちになる)。
pub fn find_duplicate_urls(table: &RouteTable) -> BTreeMap<String, Vec<String>> {
    let mut by_url: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for route in table {
        by_url
            .entry(route.url.clone())
            .or_default()
            .push(format!("{}/{}", route.module, route.action));
    }
    by_url.retain(|url, actions| {
        let duplicated = actions.len() > 1;
        if duplicated {
            warn!(url = %url, actions = ?actions, "route url declared more than once");
        }
        duplicated
    });
    by_url
}
