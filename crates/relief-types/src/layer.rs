use serde::{Deserialize, Serialize};
use std::fmt;

/// Which piece of artwork a layer carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerKind {
    Circle,
    Mountain,
    Trail,
    Bolt,
    QrModules,
}

impl LayerKind {
    pub fn name(&self) -> &'static str {
        match self {
            LayerKind::Circle => "circle",
            LayerKind::Mountain => "mountain",
            LayerKind::Trail => "trail",
            LayerKind::Bolt => "bolt",
            LayerKind::QrModules => "qr-modules",
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a layer removes material or adds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerMode {
    Cut,
    Fuse,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub kind: LayerKind,
    /// Depth as a fraction of the plan's total depth, in (0, 1].
    pub fraction: f64,
    pub mode: LayerMode,
}

impl Layer {
    pub fn cut(kind: LayerKind, fraction: f64) -> Self {
        Self {
            kind,
            fraction,
            mode: LayerMode::Cut,
        }
    }
}

/// Total depth plus the ordered layers cut or fused at fractions of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthPlan {
    pub total_depth: f64,
    pub layers: Vec<Layer>,
}

impl DepthPlan {
    /// The four-layer logo plan. The circle always sits at the full depth.
    pub fn logo(total_depth: f64, mountain: f64, trail: f64, bolt: f64) -> Self {
        Self {
            total_depth,
            layers: vec![
                Layer::cut(LayerKind::Circle, 1.0),
                Layer::cut(LayerKind::Mountain, mountain),
                Layer::cut(LayerKind::Trail, trail),
                Layer::cut(LayerKind::Bolt, bolt),
            ],
        }
    }

    pub fn absolute_depth(&self, layer: &Layer) -> f64 {
        self.total_depth * layer.fraction
    }

    /// Absolute depth of every layer, in plan order.
    pub fn depths(&self) -> Vec<(LayerKind, f64)> {
        self.layers
            .iter()
            .map(|l| (l.kind, self.absolute_depth(l)))
            .collect()
    }

    pub fn layer(&self, kind: LayerKind) -> Option<&Layer> {
        self.layers.iter().find(|l| l.kind == kind)
    }

    /// True when mountain, trail and bolt step strictly shallower, in that order.
    pub fn is_staircase(&self) -> bool {
        let f = |k| self.layer(k).map(|l| l.fraction);
        match (f(LayerKind::Mountain), f(LayerKind::Trail), f(LayerKind::Bolt)) {
            (Some(m), Some(t), Some(b)) => m > t && t > b,
            _ => true,
        }
    }
}
