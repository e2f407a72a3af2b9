//! Boolean composition of layer tools against a base solid.

use std::time::Instant;

use relief_kernel::{KernelError, KernelSolidHandle};
use relief_types::LayerMode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::extrude::LayerTool;
use crate::kernel_ext::KernelBundle;
use crate::types::{BooleanKind, ReliefError};

/// Order in which layer tools meet the base solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompositionStrategy {
    /// Cuts deepest first against the running result, then fuses in order.
    #[default]
    Sequential,
    /// Union all cut tools and subtract once, then union all fuse tools and fuse once.
    UnionThenApply,
}

#[derive(Debug, Clone)]
pub struct Composition {
    pub solid: KernelSolidHandle,
    pub booleans: usize,
    pub kernel_time_ms: f64,
}

/// Tracks every solid composition creates so none outlives the call.
struct Session<'a> {
    kb: &'a mut dyn KernelBundle,
    owned: Vec<KernelSolidHandle>,
    booleans: usize,
    elapsed_ms: f64,
}

impl Session<'_> {
    fn boolean(
        &mut self,
        op: BooleanKind,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
        label: &str,
    ) -> Result<KernelSolidHandle, ReliefError> {
        let start = Instant::now();
        let result: Result<KernelSolidHandle, KernelError> = match op {
            BooleanKind::Union => self.kb.boolean_union(a, b),
            BooleanKind::Subtract => self.kb.boolean_subtract(a, b),
        };
        self.elapsed_ms += start.elapsed().as_secs_f64() * 1000.0;
        self.booleans += 1;
        match result {
            Ok(solid) => {
                debug!(%op, layer = label, "boolean applied");
                self.owned.push(solid.clone());
                Ok(solid)
            }
            Err(source) => Err(ReliefError::BooleanOperationFailed {
                layer: label.to_string(),
                op,
                source,
            }),
        }
    }

    /// Union tools pairwise into one solid, or hand back the single tool.
    fn union_all(&mut self, tools: &[&LayerTool]) -> Result<Option<KernelSolidHandle>, ReliefError> {
        let Some((first, rest)) = tools.split_first() else {
            return Ok(None);
        };
        let mut acc = first.solid.clone();
        for tool in rest {
            acc = self.boolean(BooleanKind::Union, &acc, &tool.solid, &tool.label)?;
        }
        Ok(Some(acc))
    }

    /// Release everything owned except `keep`.
    fn finish(mut self, keep: Option<&KernelSolidHandle>) {
        let doomed: Vec<KernelSolidHandle> = self
            .owned
            .into_iter()
            .filter(|solid| Some(solid) != keep)
            .collect();
        self.kb.release_all(&doomed);
    }
}

fn group_label(tools: &[&LayerTool]) -> String {
    let mut kinds: Vec<String> = Vec::new();
    for tool in tools {
        let name = tool.kind.to_string();
        if !kinds.contains(&name) {
            kinds.push(name);
        }
    }
    kinds.join("+")
}

fn run(
    session: &mut Session<'_>,
    base: &KernelSolidHandle,
    tools: &[LayerTool],
    strategy: CompositionStrategy,
) -> Result<KernelSolidHandle, ReliefError> {
    let mut cuts: Vec<&LayerTool> = tools.iter().filter(|t| t.mode == LayerMode::Cut).collect();
    let fuses: Vec<&LayerTool> = tools.iter().filter(|t| t.mode == LayerMode::Fuse).collect();
    let mut acc = base.clone();

    match strategy {
        CompositionStrategy::Sequential => {
            cuts.sort_by(|a, b| b.depth.total_cmp(&a.depth));
            for tool in cuts {
                acc = session.boolean(BooleanKind::Subtract, &acc, &tool.solid, &tool.label)?;
            }
            for tool in fuses {
                acc = session.boolean(BooleanKind::Union, &acc, &tool.solid, &tool.label)?;
            }
        }
        CompositionStrategy::UnionThenApply => {
            if let Some(cutter) = session.union_all(&cuts)? {
                acc = session.boolean(BooleanKind::Subtract, &acc, &cutter, &group_label(&cuts))?;
            }
            if let Some(boss) = session.union_all(&fuses)? {
                acc = session.boolean(BooleanKind::Union, &acc, &boss, &group_label(&fuses))?;
            }
        }
    }
    Ok(acc)
}

/// Apply `tools` to `base` and return the final solid.
///
/// Consumes the tools: they and every intermediate result are released before
/// returning, on success and on failure. `base` is never released. A failed
/// primitive aborts the whole composition with no partial result.
#[instrument(skip(kb, base, tools), fields(tools = tools.len()))]
pub fn compose(
    kb: &mut dyn KernelBundle,
    base: &KernelSolidHandle,
    tools: Vec<LayerTool>,
    strategy: CompositionStrategy,
) -> Result<Composition, ReliefError> {
    if tools.is_empty() {
        return Err(ReliefError::invalid("layers", "no layer produced a solid"));
    }
    let mut session = Session {
        kb,
        owned: tools.iter().map(|t| t.solid.clone()).collect(),
        booleans: 0,
        elapsed_ms: 0.0,
    };

    match run(&mut session, base, &tools, strategy) {
        Ok(solid) => {
            let (booleans, kernel_time_ms) = (session.booleans, session.elapsed_ms);
            session.finish(Some(&solid));
            info!(?strategy, booleans, kernel_time_ms, "composition complete");
            Ok(Composition {
                solid,
                booleans,
                kernel_time_ms,
            })
        }
        Err(e) => {
            session.finish(None);
            Err(e)
        }
    }
}
