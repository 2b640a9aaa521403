//! Request tracing middleware.
//!
//! Each request gets a fresh [`TraceId`] which is in scope for the handler,
//! tags the request span and comes back in the `trace-id` response header.

use std::rc::Rc;
use std::task::{Context, Poll};
use std::time::Instant;

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{Instrument, debug, info_span, warn};

use crate::domain::{TRACE_ID_HEADER, TraceId};

/// Middleware factory assigning a trace id to each request.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use herdbook::Trace;
///
/// let app = App::new().wrap(Trace);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Trace;

impl<S, B> Transform<S, ServiceRequest> for Trace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceMiddleware {
            inner: Rc::new(service),
        }))
    }
}

/// Service produced by [`Trace`].
pub struct TraceMiddleware<S> {
    inner: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for TraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let inner = Rc::clone(&self.inner);
        let trace_id = TraceId::generate();
        let span = info_span!("request", %trace_id, method = %req.method(), path = %req.path());

        Box::pin(
            TraceId::scope(trace_id, async move {
                let started = Instant::now();
                let mut response = inner.call(req).await?;
                debug!(
                    status = response.status().as_u16(),
                    elapsed_ms = started.elapsed().as_millis(),
                    "request completed"
                );
                tag_response(&mut response, trace_id);
                Ok(response)
            })
            .instrument(span),
        )
    }
}

fn tag_response<B>(response: &mut ServiceResponse<B>, trace_id: TraceId) {
    let Ok(value) = HeaderValue::from_str(&trace_id.to_string()) else {
        warn!(%trace_id, "trace id is not a valid header value");
        return;
    };
    response
        .headers_mut()
        .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
}
