/// What to do with a restart-delimited face that has more than four vertices.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum PolygonPolicy {
    /// Skip the face.
    #[default]
    Drop,
    /// Split the face into a triangle fan around its first vertex.
    Fan,
}

/// Per-pass interleaving switches.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InterleaveOptions {
    pub polygon_policy: PolygonPolicy,
    /// Callers that merge parts with a known envelope can skip this.
    pub compute_bounds: bool,
}

impl Default for InterleaveOptions {
    fn default() -> Self {
        Self {
            polygon_policy: PolygonPolicy::Drop,
            compute_bounds: true,
        }
    }
}

/// Engine switches handed to the renderer when it is created.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RenderConfig {
    /// Evaluate the run-time aspects of the scene (routes, sensors, scripts).
    pub runtime_execution: bool,
    /// Present geometry at all. When off, collection passes are skipped.
    pub runtime_presentation: bool,
    /// Time-zero loading: present geometry without running behaviors.
    pub loader_only: bool,
    pub polygon_policy: PolygonPolicy,
    pub compute_bounds: bool,
}

impl RenderConfig {
    pub fn executes_behaviors(&self) -> bool {
        self.runtime_execution && !self.loader_only
    }

    pub fn interleave_options(&self) -> InterleaveOptions {
        InterleaveOptions {
            polygon_policy: self.polygon_policy,
            compute_bounds: self.compute_bounds,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            runtime_execution: true,
            runtime_presentation: true,
            loader_only: false,
            polygon_policy: PolygonPolicy::Drop,
            compute_bounds: true,
        }
    }
}
