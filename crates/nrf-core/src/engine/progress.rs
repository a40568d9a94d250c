use std::fmt;

/// Pipeline stages reported to progress listeners, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Materials,
    LineSelection,
    Normalization,
    PairSearch,
    Ranking,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Materials => "Preparing materials",
            Stage::LineSelection => "Selecting lines",
            Stage::Normalization => "Normalizing counts",
            Stage::PairSearch => "Searching line pairs",
            Stage::Ranking => "Ranking pairs",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    StageStart(Stage),
    StageFinish(Stage),

    TaskStart { total_steps: u64 },
    TaskAdvance { steps: u64 },
    TaskFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    pub fn message(&self, text: impl Into<String>) {
        if self.callback.is_some() {
            self.report(Progress::Message(text.into()));
        }
    }

    /// Runs `f` between a start and a finish event for `stage`.
    ///
    /// The finish event is sent even when `f` returns an error value.
    pub fn stage<R>(&self, stage: Stage, f: impl FnOnce() -> R) -> R {
        self.report(Progress::StageStart(stage));
        let result = f();
        self.report(Progress::StageFinish(stage));
        result
    }
}
