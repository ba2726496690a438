use actix_web::{
    body::BoxBody,
    http::{header, StatusCode},
    middleware, web, App, HttpRequest, HttpResponse, HttpServer, Responder, ResponseError,
};
use serde::Deserialize;

use crate::{
    config::Config,
    error::RelayError,
    models::{BannerReply, ErrorBody, ModelsReply, RelayReply, ATTRIBUTION, IMAGE_USAGE_HINT, USAGE_HINT},
    relay::Relay,
};

#[derive(Debug, Deserialize)]
pub struct PromptQuery {
    pub prompt: Option<String>,
}

impl ResponseError for RelayError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody::from(self))
    }
}

impl Responder for RelayReply {
    type Body = BoxBody;

    fn respond_to(self, _req: &HttpRequest) -> HttpResponse<Self::Body> {
        match self {
            RelayReply::Link(body) => HttpResponse::Ok().json(body),
            RelayReply::Hosted(body) => HttpResponse::Ok().json(body),
            RelayReply::Redirect(url) => HttpResponse::Found()
                .insert_header((header::LOCATION, url))
                .finish(),
            RelayReply::Image(image) => {
                let disposition = format!("inline; filename=\"generated.{}\"", image.file_extension());
                HttpResponse::Ok()
                    .content_type(image.content_type)
                    .insert_header((header::CONTENT_DISPOSITION, disposition))
                    .body(image.bytes)
            }
        }
    }
}

async fn index() -> HttpResponse {
    HttpResponse::Ok().json(BannerReply {
        status_code: 200,
        message: "Image relay is running".to_string(),
        usage: vec![
            USAGE_HINT.to_string(),
            IMAGE_USAGE_HINT.to_string(),
            "/models".to_string(),
        ],
        attribution: ATTRIBUTION,
    })
}

async fn models(relay: web::Data<Relay>) -> HttpResponse {
    HttpResponse::Ok().json(ModelsReply {
        status_code: 200,
        available_models: vec![relay.parameters().model.clone()],
        attribution: ATTRIBUTION,
    })
}

async fn generate(
    relay: web::Data<Relay>,
    query: web::Query<PromptQuery>,
) -> Result<RelayReply, RelayError> {
    relay.generate(query.prompt.as_deref()).await
}

async fn image(
    relay: web::Data<Relay>,
    query: web::Query<PromptQuery>,
) -> Result<RelayReply, RelayError> {
    relay.image(query.prompt.as_deref()).await
}

async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed()
        .insert_header((header::ALLOW, "GET"))
        .json(ErrorBody::new(405, "Only GET requests are allowed"))
}

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorBody::new(404, "Not Found"))
}

/// Route table shared by the real server and the tests. Pair it with
/// [`not_found`] as the app's default service.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(|err, _req| {
        log::debug!("Rejected query string: {}", err);
        RelayError::ValidationError(
            "The 'prompt' parameter must be given once, as text".to_string(),
        )
        .into()
    }));

    for (path, handler) in [
        ("/", web::get().to(index)),
        ("/models", web::get().to(models)),
        ("/generate", web::get().to(generate)),
        ("/image", web::get().to(image)),
    ] {
        cfg.service(
            web::resource(path)
                .route(handler)
                .default_service(web::to(method_not_allowed)),
        );
    }
}

pub fn cors_headers() -> middleware::DefaultHeaders {
    middleware::DefaultHeaders::new().add((header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
}

pub async fn run(config: Config) -> std::io::Result<()> {
    let relay = Relay::new(&config).map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    let relay = web::Data::new(relay);

    HttpServer::new(move || {
        App::new()
            .app_data(relay.clone())
            .wrap(cors_headers())
            .wrap(middleware::Logger::new("%a \"%r\" %s %b %Dms"))
            .configure(routes)
            .default_service(web::to(not_found))
    })
    .bind((config.bind_address.as_str(), config.port))?
    .run()
    .await
}
