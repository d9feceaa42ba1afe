//! 公告板自动滚动
//!
//! `controller`是与具体界面无关的状态机，`driver`用tokio定时器按刷新率驱动它，
//! `board`生成首尾相接的卡片列表。

pub mod board;
pub mod controller;
pub mod driver;

pub use controller::{AutoScroll, FrameId, FrameScheduler, ScrollController, ScrollState, ScrollViewport};
