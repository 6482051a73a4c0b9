// Character limits applied after trimming whitespace.
pub const MAX_COMMUNITY_NAME_LENGTH: usize = 64;
pub const MAX_TAG_NAME_LENGTH: usize = 32;
pub const MAX_POST_TITLE_LENGTH: usize = 300;
pub const MAX_POST_CONTENT_LENGTH: usize = 10_000;
pub const MAX_COMMENT_CONTENT_LENGTH: usize = 500;
