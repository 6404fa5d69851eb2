mod abort_negative_vote;
mod coordinator_crash_recovery;
mod duplicate_vote;
mod happy_path;
