//! AWS Lambda function answering greeting requests.

use lambda_runtime::Error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambdakit_greeter::run().await
}
