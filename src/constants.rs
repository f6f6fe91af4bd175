pub const DEFAULT_CATEGORY: &str = "Featured";

pub mod tmdb {

    pub const API_BASE_URL: &str = "https://api.themoviedb.org/3";

    pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

    pub const DETAILS_APPEND: &str = "credits,videos,similar";

    pub const SERVICE_NAME: &str = "TMDB";
}

pub mod session {

    pub const ADMIN_KEY: &str = "admin";

    pub const LOGIN_PAGE: &str = "/admin/login-page";
}

pub mod bootstrap {

    pub const ADMIN_USERNAME: &str = "admin";

    pub const ADMIN_PASSWORD: &str = "admin123";
}

pub mod limits {

    pub const MAX_PAGE: u32 = 500;

    pub const DASHBOARD_RECENT: usize = 5;

    pub const DETAILS_CAST: usize = 10;

    pub const DETAILS_CREW: usize = 5;

    pub const DETAILS_VIDEOS: usize = 3;

    pub const DETAILS_SIMILAR: usize = 6;

    pub const MIN_PASSWORD_LEN: usize = 8;

    pub const MIN_SESSION_SECRET_LEN: usize = 32;
}
