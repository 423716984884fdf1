pub mod compile_time {
    pub mod lexical {
        /// Maximum canonical expression length in characters
        /// SECURITY: Prevents DoS via enormous logic strings; real platform
        /// expressions are a few hundred characters at most
        pub const MAX_EXPRESSION_LENGTH: usize = 10_000;

        /// Maximum field reference length (platform caps variable names at 100)
        /// SECURITY: Prevents parser complexity attacks
        pub const MAX_FIELD_REF_LENGTH: usize = 255;

        /// Maximum number of tokens per expression
        /// SECURITY: Prevents DoS via token explosion
        pub const MAX_TOKEN_COUNT: usize = 10_000;
    }

    pub mod syntax {
        /// Maximum parenthesis nesting depth
        /// SECURITY: Bounds the chain grammar's nesting counter
        pub const MAX_NESTING_DEPTH: usize = 64;
    }

    pub mod classify {
        /// Sentinel for "not applicable: branching logic not satisfied"
        pub const DEFAULT_NA_CODE: i64 = -555;

        /// Sentinel for "logic satisfied, response still blank"
        pub const DEFAULT_BAD_CODE: i64 = -444;

        /// Separator the export format uses for checkbox choice sub-fields
        pub const CHOICE_SEPARATOR: &str = "___";

        /// Suffix of per-instrument completion markers; the platform
        /// generates these fields outside the data dictionary
        pub const COMPLETE_SUFFIX: &str = "_complete";
    }

    pub mod diagnostics {
        /// Maximum diagnostic message length
        /// RESOURCE: Prevents memory attacks via huge messages
        pub const MAX_MESSAGE_LENGTH: usize = 10_000;

        /// Maximum events retained by the in-memory logger
        /// RESOURCE: Prevents unbounded accumulation in long batch runs
        pub const MAX_RETAINED_EVENTS: usize = 10_000;
    }
}
