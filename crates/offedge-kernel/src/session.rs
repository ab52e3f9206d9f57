//! Interactive offset sessions.

use offedge_topo::{EditMesh, MeshData};
use tracing::{debug, warn};

use crate::{
    plan_offset, EditObject, OffsetAmount, OffsetError, OffsetOptions, OffsetPlan, OffsetReport,
    Result,
};

/// Pointer travel (in pointer units) per unit of width.
const POINTER_SCALE: f64 = 0.01;

/// A repeatable offset of one selection.
///
/// The session snapshots the host mesh when it begins. Each [`update`]
/// applies the offset to a fresh copy of that snapshot and writes the result
/// back to the host, so updates never compound. Loops and directions are
/// solved once and reused until an option that shapes them changes.
///
/// [`update`]: OffsetSession::update
#[derive(Debug)]
pub struct OffsetSession {
    original: MeshData,
    snapshot: EditMesh,
    object: EditObject,
    options: OffsetOptions,
    plan: Option<OffsetPlan>,
    closed: bool,
}

impl OffsetSession {
    /// Start a session on the current state of `host`.
    ///
    /// Loops and directions are solved here, so a selection that cannot be
    /// offset fails before any update. `host` is not modified.
    ///
    /// # Errors
    ///
    /// Malformed mesh data, or any solve error such as
    /// [`OffsetError::NoEdgesSelected`].
    pub fn begin(host: &MeshData, object: EditObject, options: OffsetOptions) -> Result<Self> {
        let snapshot = EditMesh::from_data(host)?;
        let plan = plan_offset(&snapshot, &object, &options)?;
        Ok(Self {
            original: host.clone(),
            snapshot,
            object,
            options,
            plan: Some(plan),
            closed: false,
        })
    }

    /// Current options.
    pub fn options(&self) -> &OffsetOptions {
        &self.options
    }

    /// Replace the options, dropping the cached solve if the new options
    /// change loops or directions.
    pub fn set_options(&mut self, options: OffsetOptions) {
        if !self.options.same_directions(&options) {
            debug!("Offset options changed; invalidating cached directions");
            self.plan = None;
        }
        self.options = options;
    }

    /// Whether the next update reuses a cached solve.
    pub fn is_cached(&self) -> bool {
        self.plan.is_some()
    }

    /// Whether the session was cancelled or failed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Offset the snapshot by `amount` and commit the result to `host`.
    ///
    /// # Errors
    ///
    /// [`OffsetError::SessionClosed`] once the session has ended. A re-solve
    /// after [`set_options`](Self::set_options) that fails restores `host`
    /// from the snapshot and ends the session.
    pub fn update(&mut self, host: &mut MeshData, amount: OffsetAmount) -> Result<OffsetReport> {
        if self.closed {
            return Err(OffsetError::SessionClosed);
        }

        if self.plan.is_none() {
            match plan_offset(&self.snapshot, &self.object, &self.options) {
                Ok(plan) => self.plan = Some(plan),
                Err(err) => {
                    warn!("Offset cancelled: {err}");
                    *host = self.original.clone();
                    self.closed = true;
                    return Err(err);
                }
            }
        }
        let Some(plan) = &self.plan else {
            return Err(OffsetError::SessionClosed);
        };

        let mut mesh = self.snapshot.clone();
        let report = plan.apply(&mut mesh, self.options.geometry_mode, amount)?;
        *host = mesh.to_data();
        Ok(report)
    }

    /// Keep the last committed result.
    pub fn confirm(self) {
        debug!("Offset session confirmed");
    }

    /// Restore `host` to the state it had when the session began.
    pub fn cancel(self, host: &mut MeshData) {
        debug!("Offset session cancelled");
        *host = self.original;
    }
}

/// Input to an [`Interaction`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Pointer moved to `(x, y)`.
    Move {
        /// Horizontal position.
        x: f64,
        /// Vertical position.
        y: f64,
    },
    /// Accept the current offset.
    Confirm,
    /// Abandon the offset.
    Cancel,
}

/// State of an [`Interaction`] after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionStatus {
    /// Waiting for more events.
    Running,
    /// Confirmed; the host keeps the offset.
    Finished,
    /// Cancelled; the host was restored.
    Cancelled,
}

/// Pointer-driven offset: horizontal drag distance sets the width.
#[derive(Debug)]
pub struct Interaction {
    session: Option<OffsetSession>,
    origin: (f64, f64),
}

impl Interaction {
    /// Begin dragging from `pointer`.
    ///
    /// Follow-face is switched on when any face of `host` is selected, and
    /// angle and depth start at zero.
    pub fn begin(
        host: &MeshData,
        object: EditObject,
        mut options: OffsetOptions,
        pointer: (f64, f64),
    ) -> Result<Self> {
        if host.faces.iter().any(|f| f.select) {
            options.follow_face = true;
        }
        options.angle = 0.0;
        options.depth = 0.0;
        Ok(Self {
            session: Some(OffsetSession::begin(host, object, options)?),
            origin: pointer,
        })
    }

    /// Options of the running session.
    pub fn options(&self) -> Option<&OffsetOptions> {
        self.session.as_ref().map(OffsetSession::options)
    }

    /// Feed one event.
    ///
    /// A solve error cancels the interaction: `host` is restored and the
    /// error is returned.
    pub fn handle(&mut self, host: &mut MeshData, event: PointerEvent) -> Result<InteractionStatus> {
        let Some(session) = self.session.as_mut() else {
            return Err(OffsetError::SessionClosed);
        };

        match event {
            PointerEvent::Move { x, .. } => {
                let mut options = session.options().clone();
                options.width = (x - self.origin.0) * POINTER_SCALE;
                let amount = options.amount();
                session.set_options(options);
                match session.update(host, amount) {
                    Ok(_) => Ok(InteractionStatus::Running),
                    Err(err) => {
                        self.session = None;
                        Err(err)
                    }
                }
            }
            PointerEvent::Confirm => {
                if let Some(session) = self.session.take() {
                    session.confirm();
                }
                Ok(InteractionStatus::Finished)
            }
            PointerEvent::Cancel => {
                if let Some(session) = self.session.take() {
                    session.cancel(host);
                }
                Ok(InteractionStatus::Cancelled)
            }
        }
    }
}
