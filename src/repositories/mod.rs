pub mod comment_repository;
pub mod community_repository;
pub mod member_repository;
pub mod post_repository;
pub mod reaction_repository;
pub mod user_repository;
pub mod vote_repository;
