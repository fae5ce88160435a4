use std::time::Duration;

/// One in-flight remote computation. Mutated only by the poll loop;
/// terminal once `completed` is set, whether by success, remote failure,
/// or the wall-clock timeout.
#[derive(Debug, Clone)]
pub struct Job {
    /// Identifier issued by the remote service. `None` when submission
    /// itself failed and the job went terminal without ever running.
    pub id: Option<String>,
    /// Which reference image this job corresponds to; results are
    /// returned in this order.
    pub input_index: usize,
    pub completed: bool,
    pub result: Option<String>,
    pub error: Option<String>,
}

impl Job {
    pub fn submitted(id: String, input_index: usize) -> Self {
        Self {
            id: Some(id),
            input_index,
            completed: false,
            result: None,
            error: None,
        }
    }

    pub fn failed_submission(input_index: usize, error: String) -> Self {
        Self {
            id: None,
            input_index,
            completed: true,
            result: None,
            error: Some(error),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.completed
    }

    pub fn is_success(&self) -> bool {
        self.completed && self.result.is_some()
    }

    pub fn succeed(&mut self, result: String) {
        self.completed = true;
        self.result = Some(result);
    }

    pub fn fail(&mut self, error: String) {
        self.completed = true;
        self.error = Some(error);
    }
}

/// Progressive polling cadence with a hard wall-clock ceiling. Defaults
/// follow the remote service's guidance: quick early polls while most
/// jobs finish, backing off for stragglers.
#[derive(Debug, Clone)]
pub struct PollSchedule {
    pub early_interval: Duration,
    pub mid_interval: Duration,
    pub late_interval: Duration,
    /// Ticks 1..=early_ticks use the early interval.
    pub early_ticks: u32,
    /// Ticks early_ticks+1..=mid_ticks use the mid interval.
    pub mid_ticks: u32,
    pub max_wall: Duration,
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self {
            early_interval: Duration::from_secs(2),
            mid_interval: Duration::from_secs(3),
            late_interval: Duration::from_secs(5),
            early_ticks: 6,
            mid_ticks: 12,
            max_wall: Duration::from_secs(180),
        }
    }
}

impl PollSchedule {
    /// Interval to wait before the given 1-based tick.
    pub fn interval_for(&self, tick: u32) -> Duration {
        if tick <= self.early_ticks {
            self.early_interval
        } else if tick <= self.mid_ticks {
            self.mid_interval
        } else {
            self.late_interval
        }
    }

    pub fn timeout_message(&self) -> String {
        let secs = self.max_wall.as_secs();
        if secs % 60 == 0 {
            format!("Request timed out after {} minutes.", secs / 60)
        } else {
            format!("Request timed out after {} seconds.", secs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_is_progressive() {
        let schedule = PollSchedule::default();
        for tick in 1..=6 {
            assert_eq!(schedule.interval_for(tick), Duration::from_secs(2));
        }
        for tick in 7..=12 {
            assert_eq!(schedule.interval_for(tick), Duration::from_secs(3));
        }
        for tick in [13, 20, 100] {
            assert_eq!(schedule.interval_for(tick), Duration::from_secs(5));
        }
    }

    #[test]
    fn default_timeout_message_names_three_minutes() {
        assert_eq!(
            PollSchedule::default().timeout_message(),
            "Request timed out after 3 minutes."
        );
    }

    #[test]
    fn terminal_transitions() {
        let mut job = Job::submitted("j-1".to_string(), 0);
        assert!(!job.is_terminal());
        job.succeed("https://cdn.example/out.png".to_string());
        assert!(job.is_terminal());
        assert!(job.is_success());

        let failed = Job::failed_submission(1, "boom".to_string());
        assert!(failed.is_terminal());
        assert!(!failed.is_success());
        assert!(failed.id.is_none());
    }
}
