use serde::Serialize;

use crate::model::notice::Notice;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardCard {
    pub key: String,
    pub notice: Notice,
}

/// 列表后面再接一份相同的副本，两份的key互不相同
pub fn looped_cards(notices: &[&Notice]) -> Vec<BoardCard> {
    let originals = notices.iter().map(|notice| BoardCard {
        key: notice.id.to_string(),
        notice: (*notice).clone(),
    });
    let duplicates = notices.iter().map(|notice| BoardCard {
        key: format!("duplicate-{}", notice.id),
        notice: (*notice).clone(),
    });
    originals.chain(duplicates).collect()
}
