//! Test data builders

use parsers_domain::JobRecord;

/// Builder for creating test JobRecord entities
pub struct JobRecordBuilder {
    name: String,
    recurrence: String,
}

impl JobRecordBuilder {
    pub fn new() -> Self {
        Self {
            name: "test_parser".to_string(),
            recurrence: "daily 9".to_string(),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_recurrence(mut self, recurrence: &str) -> Self {
        self.recurrence = recurrence.to_string();
        self
    }

    pub fn daily(self, hour: u32) -> Self {
        let recurrence = format!("daily {hour}");
        self.with_recurrence(&recurrence)
    }

    pub fn weekly(self, day: &str, hour: u32) -> Self {
        let recurrence = format!("weekly {day} {hour}");
        self.with_recurrence(&recurrence)
    }

    pub fn hourly(self, interval: &str) -> Self {
        let recurrence = format!("hourly {interval}");
        self.with_recurrence(&recurrence)
    }

    pub fn build(self) -> JobRecord {
        JobRecord::new(self.name, self.recurrence)
    }
}

impl Default for JobRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}
