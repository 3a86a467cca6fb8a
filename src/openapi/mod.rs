use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Acordos API",
        version = "0.1.0",
        description = r#"
# Acordos API

Tracks installments ("mensalidades") and payment agreements ("acordos").

- **Agreements**: bundle open installments into an agreement with a due date
- **Payments**: pay an installment; every agreement containing it is re-evaluated
- **Status**: `Aberto` until every installment is paid on time (`Concluído`),
  or any installment is paid after the due date (`Quebra`)

## Error Handling

Every failure returns a JSON body with a single `error` message, plus the
`request_id` echoed from the `x-request-id` header:

```json
{
  "error": "Uma ou mais mensalidades não estão disponíveis para acordo.",
  "request_id": "3f1c..."
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development")
    ),
    tags(
        (name = "acordos", description = "Payment agreement endpoints"),
        (name = "mensalidades", description = "Installment endpoints"),
        (name = "health", description = "Health check endpoints")
    ),
    paths(
        // Agreements
        crate::handlers::agreements::create_agreement,
        crate::handlers::agreements::list_agreements,
        crate::handlers::agreements::list_finalized_agreements,

        // Installments
        crate::handlers::installments::list_installments,
        crate::handlers::installments::list_available_installments,
        crate::handlers::installments::pay_installment,

        crate::handlers::health::health_check,
    ),
    components(
        schemas(
            crate::handlers::agreements::CreateAgreementRequest,
            crate::handlers::agreements::AgreementResponse,
            crate::handlers::agreements::AgreementWithInstallmentsResponse,
            crate::handlers::installments::InstallmentResponse,
            crate::handlers::installments::InstallmentWithAgreementsResponse,
            crate::handlers::installments::PayInstallmentRequest,
            crate::handlers::health::HealthResponse,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
