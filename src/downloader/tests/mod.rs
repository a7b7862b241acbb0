use super::test_helpers::*;
use super::*;
use crate::fetcher::RawMediaInfo;
use crate::progress::ProgressEvent;
use crate::types::Quality;
use std::time::Duration;
