mod helpers;

mod compaction_tests;
mod concurrency_tests;
