use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::http::auth::register,
        crate::presentation::http::auth::login,
        crate::presentation::http::auth::logout,
        crate::presentation::http::auth::me,
        crate::presentation::http::profile::get_profile,
        crate::presentation::http::profile::update_profile,
        crate::presentation::http::profile::change_password,
        crate::presentation::http::upload::upload_pdf,
        crate::presentation::http::data::list_books,
        crate::presentation::http::data::append_chunk,
        crate::presentation::http::data::get_book_data,
        crate::presentation::http::data::export_excel,
        crate::presentation::http::files::serve_upload,
        crate::presentation::http::files::list_files,
        crate::presentation::http::files::delete_file,
        crate::presentation::http::health::health,
        crate::presentation::ws::socket_entry,
    ),
    components(schemas(
        crate::presentation::http::auth::RegisterRequest,
        crate::presentation::http::auth::LoginRequest,
        crate::presentation::http::auth::LoginResponse,
        crate::presentation::http::auth::UserResponse,
        crate::presentation::http::profile::ProfileResponse,
        crate::presentation::http::profile::UpdateProfileRequest,
        crate::presentation::http::profile::ChangePasswordRequest,
        crate::presentation::http::upload::UploadPdfResponse,
        crate::presentation::http::upload::UploadPdfMultipart,
        crate::presentation::http::data::BookResponse,
        crate::presentation::http::data::AppendChunkRequest,
        crate::presentation::http::data::ChunkRow,
        crate::presentation::http::data::BookDataResponse,
        crate::presentation::http::files::FileResponse,
        crate::presentation::http::health::HealthResp,
    )),
    tags(
        (name = "Auth", description = "Authentication"),
        (name = "Profile", description = "Account profile"),
        (name = "Books", description = "PDF books, chunk results and exports"),
        (name = "Files", description = "Uploaded files"),
        (name = "Realtime", description = "Progress socket"),
        (name = "Health", description = "System health checks")
    )
)]
pub struct ApiDoc;
