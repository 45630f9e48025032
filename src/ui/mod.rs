pub mod style;

pub use style::{
    css_variables, generate_nonce, root_class, MotionTokens, ThemeStylesheet, MOTION_TOKENS,
    THEME_STYLESHEET_ID,
};
