use actix_web::{get, http::StatusCode, patch, post, web, HttpResponse, Responder, ResponseError};
use log::error;
use serde::Serialize;

use crate::{
    http::response::ApiResponse,
    job::{CompressionJob, JobPatch, NewJob},
    service::{JobService, RequestContext, ServiceError, UpdateJob},
};

#[derive(Serialize)]
pub struct JobData {
    pub job: CompressionJob,
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::Conflict => StatusCode::CONFLICT,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ServiceError::Internal(e) => {
                error!("internal error: {:#}", e);
                ApiResponse::error("INTERNAL_SERVER_ERROR", "internal server error")
            }
            ServiceError::Unauthorized => ApiResponse::error("UNAUTHORIZED", self.to_string()),
            ServiceError::InvalidInput(_) => ApiResponse::error("BAD_REQUEST", self.to_string()),
            ServiceError::NotFound => ApiResponse::error("NOT_FOUND", self.to_string()),
            ServiceError::Conflict => ApiResponse::error("CONFLICT", self.to_string()),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

#[post("/jobs")]
pub async fn create_job(
    service: web::Data<JobService>,
    context: RequestContext,
    body: web::Json<NewJob>,
) -> Result<impl Responder, ServiceError> {
    let job = service.create(body.into_inner(), &context).await?;
    Ok(ApiResponse::Success(JobData { job }))
}

#[patch("/jobs/{id}")]
pub async fn update_job(
    service: web::Data<JobService>,
    context: RequestContext,
    path: web::Path<String>,
    body: web::Json<JobPatch>,
) -> Result<impl Responder, ServiceError> {
    let input = UpdateJob {
        id: path.into_inner(),
        patch: body.into_inner(),
    };
    let job = service.update(input, &context).await?;
    Ok(ApiResponse::Success(JobData { job }))
}

#[get("/jobs")]
pub async fn list_jobs(
    service: web::Data<JobService>,
    context: RequestContext,
) -> Result<impl Responder, ServiceError> {
    Ok(ApiResponse::Success(service.list(&context).await?))
}

#[get("/jobs/{id}")]
pub async fn get_job(
    service: web::Data<JobService>,
    context: RequestContext,
    path: web::Path<String>,
) -> Result<impl Responder, ServiceError> {
    let job = service.get(&path.into_inner(), &context).await?;
    Ok(ApiResponse::Success(JobData { job }))
}
