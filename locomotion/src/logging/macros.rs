/// Log through the per-scope level filter configured by `init_logging`
#[macro_export]
macro_rules! scoped_log {
    ($level:ident, $scope:expr, $($arg:tt)*) => {{
        let scope: $crate::logging::LogScope = $scope;
        if $crate::logging::get_log_config().should_log(scope, $crate::logging::Level::$level) {
            $crate::logging::tracing::event!($crate::logging::Level::$level, scope = scope.as_str(), $($arg)*);
        }
    }};
}

#[macro_export]
macro_rules! input_log {
    ($level:ident, $($arg:tt)*) => {
        $crate::scoped_log!($level, $crate::logging::LogScope::Input, $($arg)*);
    };
}

#[macro_export]
macro_rules! comfort_log {
    ($level:ident, $($arg:tt)*) => {
        $crate::scoped_log!($level, $crate::logging::LogScope::Comfort, $($arg)*);
    };
}

#[macro_export]
macro_rules! locomotion_log {
    ($level:ident, $($arg:tt)*) => {
        $crate::scoped_log!($level, $crate::logging::LogScope::Locomotion, $($arg)*);
    };
}

#[macro_export]
macro_rules! teleport_log {
    ($level:ident, $($arg:tt)*) => {
        $crate::scoped_log!($level, $crate::logging::LogScope::Teleport, $($arg)*);
    };
}
