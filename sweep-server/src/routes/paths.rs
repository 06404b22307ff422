macro_rules! v1_path {
    ($path:literal) => {
        concat!("/api/v1", $path)
    };
}

pub const HEALTH: &str = "/health";

/// Versioned API route definitions
pub mod v1 {
    pub const ROOT: &str = "/api/v1";

    pub mod maintenance {
        pub const SCAN: &str = v1_path!("/maintenance/scan");
        pub const CONTINUE: &str = v1_path!("/maintenance/continue");
        pub const STATUS: &str = v1_path!("/maintenance/status");
        pub const RESET: &str = v1_path!("/maintenance/reset");
        pub const CONTENT_TYPES: &str = v1_path!("/maintenance/content-types");

        /// Paths relative to [`super::ROOT`], as mounted by the v1 router.
        pub mod relative {
            pub const SCAN: &str = "/maintenance/scan";
            pub const CONTINUE: &str = "/maintenance/continue";
            pub const STATUS: &str = "/maintenance/status";
            pub const RESET: &str = "/maintenance/reset";
            pub const CONTENT_TYPES: &str = "/maintenance/content-types";
        }
    }
}
