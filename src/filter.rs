//! 公告筛选
//!
//! 根据搜索词、部门和办公室计算可见的公告子序列。纯函数，保留输入顺序，
//! 调用方负责按发布时间倒序传入。

use serde::Serialize;

use crate::model::notice::{GetNoticesQuery, Notice};

pub const ALL_DEPARTMENTS: &str = "All Departments";
pub const ALL_OFFICES: &str = "All Offices";

/// 部门或办公室的筛选条件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Selection {
    All,
    Only(String),
}

impl Selection {
    /// 等于保留值`sentinel`时不做限制，其余（包括空字符串）按字面值精确匹配
    pub fn parse(value: &str, sentinel: &str) -> Self {
        if value == sentinel {
            Self::All
        } else {
            Self::Only(value.to_string())
        }
    }

    pub fn matches(&self, value: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => value == Some(expected.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub search: String,
    pub department: Selection,
    pub office: Selection,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            search: String::new(),
            department: Selection::All,
            office: Selection::All,
        }
    }
}

impl From<&GetNoticesQuery> for FilterCriteria {
    fn from(query: &GetNoticesQuery) -> Self {
        Self {
            // 搜索词不做trim，空白也按字面子串匹配
            search: query.search.clone().unwrap_or_default(),
            department: Self::selection(query.department.as_deref(), ALL_DEPARTMENTS),
            office: Self::selection(query.office.as_deref(), ALL_OFFICES),
        }
    }
}

impl FilterCriteria {
    // 没有传参数等同于选择了保留值
    fn selection(value: Option<&str>, sentinel: &str) -> Selection {
        value.map_or(Selection::All, |value| Selection::parse(value, sentinel))
    }

    pub fn matches(&self, notice: &Notice) -> bool {
        notice.is_active
            && self.matches_search(notice)
            && self.department.matches(notice.department.as_deref())
            && self.office.matches(notice.office.as_deref())
    }

    fn matches_search(&self, notice: &Notice) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        notice.title.to_lowercase().contains(&needle) || notice.content.to_lowercase().contains(&needle)
    }
}

pub fn filter_notices<'a, I>(notices: I, criteria: &FilterCriteria) -> Vec<&'a Notice>
where
    I: IntoIterator<Item = &'a Notice>,
{
    notices
        .into_iter()
        .filter(|notice| criteria.matches(notice))
        .collect()
}
