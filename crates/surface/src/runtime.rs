//! Drives an [`EmbeddingSurface`] on the tokio runtime.
//!
//! The surface is owned by a single task. Everything else talks to it
//! through an unbounded event queue and observes it through a `watch`
//! channel of [`FrameView`]s.

use std::time::Instant;

use reportframe_core::{
    Clock, Generation, HeightMessage, InboundMessage, ParentChannel, ReportConfiguration,
    SystemClock,
};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::surface::{EmbeddingSurface, FrameView, SurfaceEffect};

/// Input to a running surface.
#[derive(Debug, Clone)]
pub enum SurfaceEvent {
    Message(InboundMessage),
    Configure(ReportConfiguration),
    Unmount,
}

/// The task that owns a surface.
pub struct SurfaceRuntime {
    surface: EmbeddingSurface,
    events: mpsc::UnboundedReceiver<SurfaceEvent>,
    views: watch::Sender<FrameView>,
    shrink_deadline: Option<Instant>,
    clock: SystemClock,
}

impl SurfaceRuntime {
    /// Move `surface` onto its own task.
    pub fn spawn(surface: EmbeddingSurface) -> SurfaceHandle {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (views_tx, views_rx) = watch::channel(surface.view());

        let runtime = SurfaceRuntime {
            shrink_deadline: surface.shrink_window_expiry(),
            surface,
            events: events_rx,
            views: views_tx,
            clock: SystemClock,
        };
        let task = tokio::spawn(runtime.run());

        SurfaceHandle {
            events: events_tx,
            views: views_rx,
            task,
        }
    }

    async fn run(mut self) -> EmbeddingSurface {
        loop {
            let deadline = self.shrink_deadline;
            let event = tokio::select! {
                event = self.events.recv() => event,
                _ = wait_until(deadline) => {
                    self.on_shrink_deadline();
                    continue;
                }
            };
            match event {
                Some(SurfaceEvent::Message(message)) => self.on_message(message),
                Some(SurfaceEvent::Configure(config)) => self.on_configure(config),
                Some(SurfaceEvent::Unmount) | None => break,
            }
        }
        info!("Report frame unmounted");
        self.surface
    }

    fn on_message(&mut self, message: InboundMessage) {
        let now = self.clock.now();
        if let Some(outcome) = self.surface.receive(message, now) {
            if outcome.is_accepted() {
                self.publish();
            }
        }
    }

    fn on_configure(&mut self, config: ReportConfiguration) {
        let now = self.clock.now();
        for effect in self.surface.configure(config, now) {
            match effect {
                SurfaceEffect::Reload { src, generation } => {
                    debug!(%src, %generation, "Frame reload requested");
                }
                SurfaceEffect::ArmShrinkWindow { deadline } => {
                    self.shrink_deadline = Some(deadline);
                }
            }
        }
        self.publish();
    }

    fn on_shrink_deadline(&mut self) {
        let now = self.clock.now();
        if self.surface.shrink_window_elapsed(now) {
            debug!("Shrink window closed");
        }
        self.shrink_deadline = self.surface.shrink_window_expiry();
    }

    fn publish(&self) {
        let view = self.surface.view();
        self.views.send_if_modified(|current| {
            if *current == view {
                false
            } else {
                *current = view;
                true
            }
        });
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}

/// Owner-side handle to a running surface. Dropping it unmounts the surface,
/// even while frame ports are still held by content.
pub struct SurfaceHandle {
    events: mpsc::UnboundedSender<SurfaceEvent>,
    views: watch::Receiver<FrameView>,
    task: JoinHandle<EmbeddingSurface>,
}

impl SurfaceHandle {
    /// Push a new configuration. Returns false once the surface is gone.
    pub fn configure(&self, config: ReportConfiguration) -> bool {
        self.events.send(SurfaceEvent::Configure(config)).is_ok()
    }

    /// Deliver a message as if posted by the frame's content.
    pub fn deliver(&self, message: InboundMessage) -> bool {
        self.events.send(SurfaceEvent::Message(message)).is_ok()
    }

    /// The current view.
    pub fn view(&self) -> FrameView {
        self.views.borrow().clone()
    }

    /// A receiver notified on every published view.
    pub fn subscribe(&self) -> watch::Receiver<FrameView> {
        self.views.clone()
    }

    /// A channel for content loaded as `generation`.
    pub fn port(&self, generation: Generation) -> FramePort {
        FramePort {
            generation,
            events: self.events.clone(),
        }
    }

    /// A channel for whatever content the frame currently shows.
    pub fn current_port(&self) -> Option<FramePort> {
        self.view().generation().map(|generation| self.port(generation))
    }

    /// Stop the surface and wait for its task to finish.
    ///
    /// Returns the surface as it was at teardown, or `None` if the task
    /// panicked.
    pub async fn unmount(mut self) -> Option<EmbeddingSurface> {
        let _ = self.events.send(SurfaceEvent::Unmount);
        (&mut self.task).await.ok()
    }
}

impl Drop for SurfaceHandle {
    fn drop(&mut self) {
        let _ = self.events.send(SurfaceEvent::Unmount);
    }
}

/// The parent side of one frame load, as seen by its content.
#[derive(Debug, Clone)]
pub struct FramePort {
    generation: Generation,
    events: mpsc::UnboundedSender<SurfaceEvent>,
}

impl FramePort {
    pub fn generation(&self) -> Generation {
        self.generation
    }
}

impl ParentChannel for FramePort {
    fn post(&self, message: &HeightMessage) {
        let inbound = InboundMessage::new(self.generation, message.to_payload());
        if self.events.send(SurfaceEvent::Message(inbound)).is_err() {
            debug!(generation = %self.generation, "Surface gone, dropping height message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::HostContext;
    use reportframe_composer::Composer;
    use reportframe_core::Zoom;
    use reportframe_reconciler::ReconcilePolicy;
    use std::time::Duration;

    const ADDRESS: &str = "https://host/reports/report?/Ops/Backlog";

    fn spawn(config: ReportConfiguration) -> SurfaceHandle {
        SurfaceRuntime::spawn(EmbeddingSurface::mount(
            config,
            Composer::default(),
            ReconcilePolicy::default(),
            HostContext::default(),
        ))
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn posted_heights_resize_the_frame() {
        let handle = spawn(ReportConfiguration::for_address(ADDRESS));
        let mut views = handle.subscribe();
        let port = handle.current_port().unwrap();

        port.post(&HeightMessage::new(1300));
        views.changed().await.unwrap();

        assert_eq!(views.borrow().height(), Some(1325));
        handle.unmount().await;
    }

    #[tokio::test(start_paused = true)]
    async fn reload_ignores_old_content() {
        let config = ReportConfiguration::for_address(ADDRESS);
        let handle = spawn(config.clone());
        let old_port = handle.current_port().unwrap();
        let mut views = handle.subscribe();

        assert!(handle.configure(ReportConfiguration {
            zoom: Some(Zoom::PageWidth),
            ..config
        }));
        views.changed().await.unwrap();
        let new_port = handle.current_port().unwrap();
        assert_eq!(new_port.generation(), Generation(2));

        old_port.post(&HeightMessage::new(2000));
        settle().await;
        assert_eq!(handle.view().height(), Some(800));

        new_port.post(&HeightMessage::new(650));
        views.changed().await.unwrap();
        assert_eq!(handle.view().height(), Some(675));
        handle.unmount().await;
    }

    #[tokio::test(start_paused = true)]
    async fn shrink_window_timer_closes_the_window() {
        let config = ReportConfiguration::for_address(ADDRESS);
        let handle = spawn(config.clone());

        handle.configure(ReportConfiguration {
            show_parameters: true,
            ..config
        });
        settle().await;
        let port = handle.current_port().unwrap();

        tokio::time::sleep(Duration::from_secs(6)).await;
        port.post(&HeightMessage::new(300));
        settle().await;
        assert_eq!(handle.view().height(), Some(800));

        let surface = handle.unmount().await.unwrap();
        assert_eq!(surface.shrink_window_expiry(), None);
        assert!(!surface.reconciler().shrink_allowed(Instant::now()));
    }

    #[tokio::test(start_paused = true)]
    async fn settings_change_inside_the_window_extends_it() {
        let config = ReportConfiguration::for_address(ADDRESS);
        let handle = spawn(config.clone());

        handle.configure(ReportConfiguration {
            show_parameters: true,
            ..config.clone()
        });
        tokio::time::sleep(Duration::from_secs(3)).await;
        handle.configure(ReportConfiguration {
            show_parameters: true,
            zoom: Some(Zoom::WholePage),
            ..config
        });
        settle().await;
        let port = handle.current_port().unwrap();
        assert_eq!(port.generation(), Generation(3));

        // Past the first window's deadline, inside the second.
        tokio::time::sleep(Duration::from_secs(3)).await;
        port.post(&HeightMessage::new(300));
        settle().await;
        assert_eq!(handle.view().height(), Some(325));

        tokio::time::sleep(Duration::from_secs(3)).await;
        let surface = handle.unmount().await.unwrap();
        assert_eq!(surface.shrink_window_expiry(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn unmount_stops_the_task() {
        let handle = spawn(ReportConfiguration::for_address(ADDRESS));
        let port = handle.current_port().unwrap();
        let views = handle.subscribe();

        handle.unmount().await;

        port.post(&HeightMessage::new(1800));
        assert!(views.has_changed().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_unmounts_while_ports_are_held() {
        let handle = spawn(ReportConfiguration::for_address(ADDRESS));
        let port = handle.current_port().unwrap();
        let mut views = handle.subscribe();

        drop(handle);
        assert!(views.changed().await.is_err());

        port.post(&HeightMessage::new(1500));
        settle().await;
        assert_eq!(views.borrow().height(), Some(800));
    }
}
