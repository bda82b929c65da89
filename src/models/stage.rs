use serde::{Deserialize, Serialize};
use std::fmt;

/// Etapas del pipeline de generación, en orden de ejecución
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Generate,
    Comment,
    Transform,
    Export,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Fetch,
        Stage::Generate,
        Stage::Comment,
        Stage::Transform,
        Stage::Export,
    ];

    /// Marca usada en logs y mensajes de error
    pub fn tag(&self) -> &'static str {
        match self {
            Stage::Fetch => "Step 0",
            Stage::Generate => "Step 1",
            Stage::Comment => "Step 2",
            Stage::Transform => "Step 3",
            Stage::Export => "Step 4",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Fetch => "fetch",
            Stage::Generate => "generate",
            Stage::Comment => "comment",
            Stage::Transform => "transform",
            Stage::Export => "export",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.tag(), self.name())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Pending,
    Succeeded,
    Failed,
    Skipped,
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageStatus::Pending => write!(f, "⏳ Pendiente"),
            StageStatus::Succeeded => write!(f, "✅ Completada"),
            StageStatus::Failed => write!(f, "❌ Fallida"),
            StageStatus::Skipped => write!(f, "⏭️ Omitida"),
        }
    }
}
