#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollState {
    Running,
    Paused,
}

/// 可滚动的容器
pub trait ScrollViewport {
    fn content_height(&self) -> f64;
    fn viewport_height(&self) -> f64;
    fn set_scroll_top(&mut self, offset: f64);
}

/// 滚动状态机，初始为Running
#[derive(Debug, Clone)]
pub struct ScrollController {
    state: ScrollState,
    offset: f64,
    step: f64,
}

impl ScrollController {
    pub fn new(step: f64) -> Self {
        Self {
            state: ScrollState::Running,
            offset: 0.0,
            step,
        }
    }

    pub fn state(&self) -> ScrollState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ScrollState::Running
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn pointer_enter(&mut self) {
        self.state = ScrollState::Paused;
    }

    pub fn pointer_leave(&mut self) {
        self.state = ScrollState::Running;
    }

    pub fn toggle(&mut self) {
        self.state = match self.state {
            ScrollState::Running => ScrollState::Paused,
            ScrollState::Paused => ScrollState::Running,
        };
    }

    /// 推进一帧。暂停时不做任何事并返回false
    ///
    /// 偏移量到达`content_height - viewport_height`后归零，下一帧直接跳回顶部。
    pub fn tick<V: ScrollViewport + ?Sized>(&mut self, viewport: &mut V) -> bool {
        if !self.is_running() {
            return false;
        }
        self.offset += self.step;
        viewport.set_scroll_top(self.offset);
        if self.offset >= viewport.content_height() - viewport.viewport_height() {
            self.offset = 0.0;
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub u64);

/// 每次显示刷新回调一次的帧调度器
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameId;
    fn cancel_frame(&mut self, id: FrameId);
}

/// 把状态机、容器和帧调度器绑在一起
///
/// 同一时刻最多只有一个待执行的帧。暂停时不再申请新帧，`teardown`或drop时取消待执行的帧。
pub struct AutoScroll<V: ScrollViewport, S: FrameScheduler> {
    controller: ScrollController,
    viewport: Option<V>,
    scheduler: S,
    pending: Option<FrameId>,
}

impl<V: ScrollViewport, S: FrameScheduler> AutoScroll<V, S> {
    pub fn new(controller: ScrollController, scheduler: S) -> Self {
        Self {
            controller,
            viewport: None,
            scheduler,
            pending: None,
        }
    }

    /// 容器不存在时静默跳过，动画不会启动
    pub fn mount(&mut self, viewport: Option<V>) {
        self.cancel();
        self.viewport = viewport;
        if self.viewport.is_none() {
            tracing::debug!("滚动容器不存在，跳过自动滚动");
            return;
        }
        self.schedule();
    }

    pub fn on_frame(&mut self, id: FrameId) {
        // 已取消或过期的帧
        if self.pending != Some(id) {
            return;
        }
        self.pending = None;
        let viewport = match self.viewport.as_mut() {
            Some(v) => v,
            None => return,
        };
        if self.controller.tick(viewport) {
            self.schedule();
        }
    }

    pub fn pointer_enter(&mut self) {
        self.controller.pointer_enter();
        self.cancel();
    }

    pub fn pointer_leave(&mut self) {
        self.controller.pointer_leave();
        self.schedule();
    }

    pub fn toggle(&mut self) {
        self.controller.toggle();
        if self.controller.is_running() {
            self.schedule();
        } else {
            self.cancel();
        }
    }

    pub fn teardown(&mut self) {
        self.cancel();
        self.viewport = None;
    }

    pub fn controller(&self) -> &ScrollController {
        &self.controller
    }

    pub fn viewport(&self) -> Option<&V> {
        self.viewport.as_ref()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn pending_frame(&self) -> Option<FrameId> {
        self.pending
    }

    fn schedule(&mut self) {
        if self.pending.is_none() && self.viewport.is_some() && self.controller.is_running() {
            self.pending = Some(self.scheduler.request_frame());
        }
    }

    fn cancel(&mut self) {
        if let Some(id) = self.pending.take() {
            self.scheduler.cancel_frame(id);
        }
    }
}

impl<V: ScrollViewport, S: FrameScheduler> Drop for AutoScroll<V, S> {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Debug, Default)]
    struct Viewport {
        content_height: f64,
        viewport_height: f64,
        scroll_top: f64,
        writes: usize,
    }

    impl Viewport {
        fn new(content_height: f64, viewport_height: f64) -> Self {
            Self {
                content_height,
                viewport_height,
                ..Default::default()
            }
        }
    }

    impl ScrollViewport for Viewport {
        fn content_height(&self) -> f64 {
            self.content_height
        }

        fn viewport_height(&self) -> f64 {
            self.viewport_height
        }

        fn set_scroll_top(&mut self, offset: f64) {
            self.scroll_top = offset;
            self.writes += 1;
        }
    }

    #[derive(Debug, Default)]
    struct Frames {
        next: u64,
        live: Vec<FrameId>,
        cancelled: Vec<FrameId>,
    }

    // 与测试共享状态，drop之后仍可检查
    #[derive(Clone, Default)]
    struct Scheduler(Rc<RefCell<Frames>>);

    impl FrameScheduler for Scheduler {
        fn request_frame(&mut self) -> FrameId {
            let mut frames = self.0.borrow_mut();
            frames.next += 1;
            let id = FrameId(frames.next);
            frames.live.push(id);
            id
        }

        fn cancel_frame(&mut self, id: FrameId) {
            let mut frames = self.0.borrow_mut();
            frames.live.retain(|f| *f != id);
            frames.cancelled.push(id);
        }
    }

    impl Scheduler {
        fn live(&self) -> Vec<FrameId> {
            self.0.borrow().live.clone()
        }

        fn cancelled(&self) -> Vec<FrameId> {
            self.0.borrow().cancelled.clone()
        }

        // 模拟一次显示刷新：执行所有待执行的帧
        fn fire(&self, scroll: &mut AutoScroll<Viewport, Scheduler>) {
            let due: Vec<FrameId> = self.0.borrow_mut().live.drain(..).collect();
            for id in due {
                scroll.on_frame(id);
            }
        }
    }

    fn mounted(content_height: f64, viewport_height: f64) -> (AutoScroll<Viewport, Scheduler>, Scheduler) {
        let scheduler = Scheduler::default();
        let mut scroll = AutoScroll::new(ScrollController::new(1.0), scheduler.clone());
        scroll.mount(Some(Viewport::new(content_height, viewport_height)));
        (scroll, scheduler)
    }

    #[test]
    fn controller_starts_running_and_advances_by_step() {
        let mut controller = ScrollController::new(2.0);
        let mut viewport = Viewport::new(1000.0, 100.0);
        assert_eq!(controller.state(), ScrollState::Running);
        assert!(controller.tick(&mut viewport));
        assert!(controller.tick(&mut viewport));
        assert_eq!(controller.offset(), 4.0);
        assert_eq!(viewport.scroll_top, 4.0);
    }

    #[test]
    fn pointer_enter_pauses_and_freezes_offset() {
        let mut controller = ScrollController::new(1.0);
        let mut viewport = Viewport::new(1000.0, 100.0);
        controller.tick(&mut viewport);
        controller.pointer_enter();
        assert_eq!(controller.state(), ScrollState::Paused);
        for _ in 0..5 {
            assert!(!controller.tick(&mut viewport));
        }
        assert_eq!(controller.offset(), 1.0);
        assert_eq!(viewport.writes, 1);

        controller.pointer_leave();
        assert_eq!(controller.state(), ScrollState::Running);
        controller.tick(&mut viewport);
        assert_eq!(controller.offset(), 2.0);
    }

    #[test]
    fn toggle_flips_state_regardless_of_pointer() {
        let mut controller = ScrollController::new(1.0);
        controller.toggle();
        assert_eq!(controller.state(), ScrollState::Paused);
        controller.toggle();
        assert_eq!(controller.state(), ScrollState::Running);
        controller.pointer_enter();
        controller.toggle();
        assert_eq!(controller.state(), ScrollState::Running);
    }

    #[test]
    fn offset_resets_to_zero_at_the_scroll_limit() {
        let mut controller = ScrollController::new(1.0);
        let mut viewport = Viewport::new(110.0, 100.0);
        for _ in 0..9 {
            controller.tick(&mut viewport);
        }
        assert_eq!(controller.offset(), 9.0);
        controller.tick(&mut viewport);
        // 到达上限的那一帧先写入10，然后累加器归零
        assert_eq!(viewport.scroll_top, 10.0);
        assert_eq!(controller.offset(), 0.0);
        controller.tick(&mut viewport);
        assert_eq!(viewport.scroll_top, 1.0);
    }

    #[test]
    fn content_shorter_than_viewport_resets_every_frame() {
        let mut controller = ScrollController::new(1.0);
        let mut viewport = Viewport::new(50.0, 100.0);
        controller.tick(&mut viewport);
        assert_eq!(controller.offset(), 0.0);
    }

    #[test]
    fn mount_requests_one_frame_and_frames_keep_rescheduling() {
        let (mut scroll, scheduler) = mounted(1000.0, 100.0);
        assert_eq!(scheduler.live().len(), 1);
        for _ in 0..3 {
            scheduler.fire(&mut scroll);
        }
        assert_eq!(scroll.controller().offset(), 3.0);
        assert_eq!(scheduler.live().len(), 1);
    }

    #[test]
    fn missing_viewport_never_starts() {
        let scheduler = Scheduler::default();
        let mut scroll: AutoScroll<Viewport, Scheduler> =
            AutoScroll::new(ScrollController::new(1.0), scheduler.clone());
        scroll.mount(None);
        assert!(scheduler.live().is_empty());
        scroll.pointer_leave();
        scroll.toggle();
        scroll.toggle();
        assert!(scheduler.live().is_empty());
        assert_eq!(scroll.controller().offset(), 0.0);
    }

    #[test]
    fn pause_cancels_pending_frame_and_stops_rescheduling() {
        let (mut scroll, scheduler) = mounted(1000.0, 100.0);
        scheduler.fire(&mut scroll);
        scroll.pointer_enter();
        assert_eq!(scroll.controller().state(), ScrollState::Paused);
        assert!(scheduler.live().is_empty());
        assert!(scroll.pending_frame().is_none());
        for _ in 0..5 {
            scheduler.fire(&mut scroll);
        }
        assert_eq!(scroll.controller().offset(), 1.0);

        scroll.pointer_leave();
        assert_eq!(scheduler.live().len(), 1);
        scheduler.fire(&mut scroll);
        assert_eq!(scroll.controller().offset(), 2.0);
    }

    #[test]
    fn toggle_pauses_and_resumes_frames() {
        let (mut scroll, scheduler) = mounted(1000.0, 100.0);
        scroll.toggle();
        assert!(scheduler.live().is_empty());
        scroll.toggle();
        assert_eq!(scheduler.live().len(), 1);
    }

    #[test]
    fn stale_frame_is_ignored() {
        let (mut scroll, scheduler) = mounted(1000.0, 100.0);
        let first = scheduler.live()[0];
        scroll.pointer_enter();
        scroll.pointer_leave();
        scroll.on_frame(first);
        assert_eq!(scroll.controller().offset(), 0.0);
        assert_eq!(scheduler.live().len(), 1);
    }

    #[test]
    fn teardown_cancels_pending_frame() {
        let (mut scroll, scheduler) = mounted(1000.0, 100.0);
        scheduler.fire(&mut scroll);
        let pending = scroll.pending_frame().unwrap();
        scroll.teardown();
        assert_eq!(scheduler.cancelled(), vec![pending]);
        assert!(scheduler.live().is_empty());

        scroll.on_frame(pending);
        assert_eq!(scroll.controller().offset(), 1.0);
        assert!(scroll.viewport().is_none());
    }

    #[test]
    fn drop_cancels_pending_frame() {
        let (scroll, scheduler) = mounted(1000.0, 100.0);
        let pending = scroll.pending_frame().unwrap();
        drop(scroll);
        assert_eq!(scheduler.cancelled(), vec![pending]);
        assert!(scheduler.live().is_empty());
    }
}
