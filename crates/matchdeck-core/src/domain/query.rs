//! Query - ライブ購読するコレクションクエリ
//!
//! フィード用のクエリは「判定済みのユーザーを除く全プロフィール」。
//! 除外集合が空のときは Filter::None（フィルタなし）にする。
//! ストア側は空の not-in リストを受け付けないため、
//! ダミー値を詰めるのではなくクエリ構築の段階で分岐させる。

use std::collections::BTreeSet;

use super::path::CollectionPath;

/// Filter はドキュメント ID に対する条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// 条件なし（コレクション全件）
    None,
    /// ID が集合に含まれないドキュメントのみ
    IdNotIn(BTreeSet<String>),
}

/// Query はコレクション + フィルタ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    collection: CollectionPath,
    filter: Filter,
}

impl Query {
    pub fn collection(collection: CollectionPath) -> Self {
        Self {
            collection,
            filter: Filter::None,
        }
    }

    /// 除外する ID を追加する
    ///
    /// 空のイテレータを渡した場合はフィルタを変更しない。
    pub fn excluding_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ids: BTreeSet<String> = ids.into_iter().map(Into::into).collect();
        if ids.is_empty() {
            return self;
        }
        if let Filter::IdNotIn(existing) = &mut self.filter {
            existing.append(&mut ids);
        } else {
            self.filter = Filter::IdNotIn(ids);
        }
        self
    }

    /// フィルタをそのまま差し替える
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn collection_path(&self) -> &CollectionPath {
        &self.collection
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// `doc_id` がこのクエリの結果に含まれるか
    pub fn matches(&self, doc_id: &str) -> bool {
        match &self.filter {
            Filter::None => true,
            Filter::IdNotIn(ids) => !ids.contains(doc_id),
        }
    }
}
