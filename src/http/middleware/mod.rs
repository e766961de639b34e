pub mod post_authority;
