//! Shared constants for test infrastructure

// Version constants
pub const VERSION_1_0_0: &str = "1.0.0";
pub const VERSION_1_1_0: &str = "1.1.0";
pub const TAG_V1_0_0: &str = "v1.0.0";
pub const TAG_V1_1_0: &str = "v1.1.0";

// Identifiers
pub const PACKAGE_ID: &str = "alexhowarth/hacs-aws-test";
pub const RESOURCE_ID: &str = "update.hello_aws_iot_update";
pub const RECORD_ID: &str = "812345678";
pub const CATEGORY: &str = "integration";
pub const USER_AGENT: &str = "upkeep-tests";

// Host state strings
pub const STATE_ON: &str = "on";
pub const STATE_OFF: &str = "off";
