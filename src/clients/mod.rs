//! Handles for talking to services.

/// Generates a client method that sends a request carrying a oneshot reply
/// channel and waits for the answer, with tracing around the call.
macro_rules! client_method {
    ($client:ty => fn $method:ident($($param:ident: $param_type:ty),*) -> $return_type:ty as $request:ident::$variant:ident) => {
        impl $client {
            #[tracing::instrument(skip(self))]
            pub async fn $method(&self, $($param: $param_type),*) -> Result<$return_type, crate::error::ViewError> {
                tracing::debug!("Sending request");
                let (respond_to, response) = tokio::sync::oneshot::channel();
                self.sender
                    .send($request::$variant {
                        $($param,)*
                        respond_to,
                    })
                    .await
                    .map_err(|_| crate::error::ViewError::ServiceClosed("Service closed".to_string()))?;

                response
                    .await
                    .map_err(|_| crate::error::ViewError::ServiceClosed("Service dropped the request".to_string()))?
            }
        }
    };
}

mod order_view_client;

pub use order_view_client::*;
