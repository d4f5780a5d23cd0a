//! Pass pipeline configuration.

/// Options shared by the pass manager and every pass.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PassOptions {
    /// Name of the function that `global_stmts` wraps top-level items into.
    pub run_fun: String,
    /// Do not synthesize `main_program` in `global_stmts_program`.
    pub disable_main: bool,
    /// Log each pass at `info` instead of `debug`.
    pub verbose: bool,
    /// Measure every pass and return the timings.
    pub time_report: bool,
    /// Requesting a pass runs every default pass up to and including it.
    pub pass_cumulative: bool,
    /// Re-run the verifier after every pass.
    pub verify_after_each_pass: bool,
    /// Passes never run, even when requested.
    pub skip_passes: Vec<String>,
}

impl Default for PassOptions {
    fn default() -> Self {
        PassOptions {
            run_fun: "_lfortran_main_program".to_owned(),
            disable_main: false,
            verbose: false,
            time_report: false,
            pass_cumulative: false,
            verify_after_each_pass: cfg!(debug_assertions),
            skip_passes: Vec::new(),
        }
    }
}

impl PassOptions {
    #[must_use]
    pub fn with_run_fun(mut self, name: impl Into<String>) -> Self {
        self.run_fun = name.into();
        self
    }

    #[must_use]
    pub fn with_disable_main(mut self, disable: bool) -> Self {
        self.disable_main = disable;
        self
    }

    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    #[must_use]
    pub fn with_time_report(mut self, report: bool) -> Self {
        self.time_report = report;
        self
    }

    #[must_use]
    pub fn with_pass_cumulative(mut self, cumulative: bool) -> Self {
        self.pass_cumulative = cumulative;
        self
    }

    #[must_use]
    pub fn with_verify_after_each_pass(mut self, verify: bool) -> Self {
        self.verify_after_each_pass = verify;
        self
    }

    /// Add `name` to the skip list.
    #[must_use]
    pub fn with_skip_pass(mut self, name: impl Into<String>) -> Self {
        self.skip_passes.push(name.into());
        self
    }

    pub fn is_skipped(&self, name: &str) -> bool {
        self.skip_passes.iter().any(|s| s == name)
    }
}
