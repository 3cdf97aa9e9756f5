macro_rules! trace {
    ( @tokens $token:expr ) => {
        #[cfg(feature = "debug_trace")]
        println!("@token: {:?}", $token);
    };

    ( @event $($args:tt)+ ) => {
        #[cfg(feature = "debug_trace")]
        println!("@event: {}", format!($($args)+));
    };

    ( @css $($args:tt)+ ) => {
        #[cfg(feature = "debug_trace")]
        println!("@css: {}", format!($($args)+));
    };
}
