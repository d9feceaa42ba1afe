use std::time::Duration;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use super::controller::{ScrollController, ScrollViewport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollCommand {
    PointerEnter,
    PointerLeave,
    Toggle,
}

/// 自动滚动任务的句柄，drop时终止任务
pub struct ScrollHandle {
    commands: UnboundedSender<ScrollCommand>,
    task: Option<JoinHandle<()>>,
}

impl ScrollHandle {
    pub fn pointer_enter(&self) {
        self.send(ScrollCommand::PointerEnter);
    }

    pub fn pointer_leave(&self) {
        self.send(ScrollCommand::PointerLeave);
    }

    pub fn toggle(&self) {
        self.send(ScrollCommand::Toggle);
    }

    pub fn is_active(&self) -> bool {
        matches!(&self.task, Some(task) if !task.is_finished())
    }

    pub fn teardown(mut self) {
        self.abort();
    }

    fn send(&self, command: ScrollCommand) {
        if self.commands.send(command).is_err() {
            tracing::debug!("自动滚动任务已结束，忽略指令: {:?}", command);
        }
    }

    fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for ScrollHandle {
    fn drop(&mut self) {
        self.abort();
    }
}

/// 启动自动滚动任务，每秒`refresh_rate`帧
///
/// 容器不存在时不启动任务。暂停期间任务只等待指令，不会被定时器唤醒。
pub fn spawn<V>(controller: ScrollController, viewport: Option<V>, refresh_rate: u32) -> ScrollHandle
where
    V: ScrollViewport + Send + 'static,
{
    let (commands, receiver) = unbounded_channel();
    let task = match viewport {
        Some(viewport) => {
            let frame = Duration::from_secs(1) / refresh_rate.max(1);
            Some(tokio::spawn(run(controller, viewport, frame, receiver)))
        }
        None => {
            tracing::debug!("滚动容器不存在，跳过自动滚动");
            None
        }
    };
    ScrollHandle { commands, task }
}

async fn run<V: ScrollViewport>(
    mut controller: ScrollController,
    mut viewport: V,
    frame: Duration,
    mut commands: UnboundedReceiver<ScrollCommand>,
) {
    let mut ticker = interval(frame);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        if controller.is_running() {
            tokio::select! {
                _ = ticker.tick() => {
                    controller.tick(&mut viewport);
                }
                command = commands.recv() => match command {
                    Some(command) => apply(&mut controller, command),
                    None => break,
                },
            }
        } else {
            match commands.recv().await {
                Some(command) => {
                    apply(&mut controller, command);
                    if controller.is_running() {
                        ticker.reset();
                    }
                }
                None => break,
            }
        }
    }
    tracing::debug!("自动滚动任务结束");
}

fn apply(controller: &mut ScrollController, command: ScrollCommand) {
    match command {
        ScrollCommand::PointerEnter => controller.pointer_enter(),
        ScrollCommand::PointerLeave => controller.pointer_leave(),
        ScrollCommand::Toggle => controller.toggle(),
    }
}
