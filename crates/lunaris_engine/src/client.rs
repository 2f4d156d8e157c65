use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart;
use tokio_util::io::ReaderStream;

use crate::lines::{LineSink, LineSplitter};
use crate::persist::AtomicFileWriter;
use crate::types::{
    map_reqwest_error, ClientError, ClientSettings, JobId, JobStatus, SchemaResponse, SessionData,
};

/// Typed client for the predictor backend endpoints.
#[derive(Debug, Clone)]
pub struct PredictorClient {
    base_url: String,
    http: reqwest::Client,
}

impl PredictorClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        let base_url = settings.base_url.trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url).map_err(|err| ClientError::InvalidUrl(err.to_string()))?;

        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ClientError::Network(err.to_string()))?;

        Ok(Self { base_url, http })
    }

    fn predictor_url(&self, tail: &str) -> String {
        format!("{}/lunaris/predictor/{tail}", self.base_url)
    }

    /// Uploads an input file, with an optional filter expression riding
    /// along in the form. Returns the job id the server assigned.
    pub async fn upload(&self, path: &Path, filter: Option<&str>) -> Result<JobId, ClientError> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("inputFile")
            .to_string();
        let file = tokio::fs::File::open(path).await?;
        let part = multipart::Part::stream(reqwest::Body::wrap_stream(ReaderStream::new(file)))
            .file_name(file_name);

        let mut form = multipart::Form::new();
        if let Some(filter) = filter {
            form = form.text("filter", filter.to_string());
        }
        form = form.part("inputFile", part);

        let response = self
            .http
            .post(self.predictor_url("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = check_status(response)?;
        let id = response.text().await.map_err(map_reqwest_error)?;
        Ok(id.trim().to_string())
    }

    pub async fn status(&self, job_id: &str) -> Result<JobStatus, ClientError> {
        let response = self
            .http
            .get(self.predictor_url(&format!("status/{job_id}")))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = check_status(response)?;
        response.json::<JobStatus>().await.map_err(map_reqwest_error)
    }

    /// Streams the results of a finished job into `out_dir`, atomically.
    /// Returns the path of the written file.
    pub async fn download_results(
        &self,
        job_id: &str,
        file_name: &str,
        out_dir: &Path,
    ) -> Result<PathBuf, ClientError> {
        let response = self
            .http
            .get(self.predictor_url(&format!("results/{job_id}")))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = check_status(response)?;

        let writer = AtomicFileWriter::new(out_dir.to_path_buf());
        let mut write = writer.begin(&results_file_name(job_id, file_name))?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            write.append(&chunk)?;
        }
        Ok(write.commit()?)
    }

    /// Fetches the available field names. A server-reported schema error
    /// surfaces as `ClientError::Schema`; names are returned raw, without
    /// normalization.
    pub async fn schema(&self) -> Result<Vec<String>, ClientError> {
        let response = self
            .http
            .get(self.predictor_url("schema"))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = check_status(response)?;
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        let schema: SchemaResponse =
            serde_json::from_slice(&body).map_err(|err| ClientError::Decode(err.to_string()))?;
        if schema.is_error {
            return Err(ClientError::Schema(schema.message));
        }
        schema
            .col_names
            .ok_or_else(|| ClientError::Schema("no col_names in schema response".to_string()))
    }

    pub async fn mask_list(&self) -> Result<Vec<String>, ClientError> {
        let response = self
            .http
            .get(self.predictor_url("masks/list"))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = check_status(response)?;
        response
            .json::<Vec<String>>()
            .await
            .map_err(map_reqwest_error)
    }

    /// Fetches the filter text of one named mask preset.
    pub async fn mask(&self, name: &str) -> Result<String, ClientError> {
        let response = self
            .http
            .get(self.predictor_url(&format!("masks/{name}")))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = check_status(response)?;
        response.text().await.map_err(map_reqwest_error)
    }

    pub async fn session(&self, session_id: &str) -> Result<SessionData, ClientError> {
        let response = self
            .http
            .get(self.predictor_url(&format!("session/{session_id}")))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = check_status(response)?;
        response
            .json::<SessionData>()
            .await
            .map_err(map_reqwest_error)
    }

    /// Posts a JSON query request and feeds the line-delimited response
    /// through `sink` as lines complete.
    pub async fn query(&self, request: &str, sink: &dyn LineSink) -> Result<(), ClientError> {
        let response = self
            .http
            .post(format!("{}/lunaris/query", self.base_url))
            .header(CONTENT_TYPE, "application/json")
            .body(request.to_string())
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = check_status(response)?;

        let mut splitter = LineSplitter::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            splitter.push(&chunk, &mut |line| sink.line(line));
        }
        splitter.finish(&mut |line| sink.line(line));
        Ok(())
    }
}

/// Name of the local file a job's results are saved under. Carries the
/// job id so two inputs sharing a base name save to distinct files.
pub fn results_file_name(job_id: &str, input_file_name: &str) -> String {
    if input_file_name.is_empty() {
        format!("{job_id}.results.tsv")
    } else {
        format!("{input_file_name}.{job_id}.results.tsv")
    }
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ClientError::Http {
            status: status.as_u16(),
            message: status
                .canonical_reason()
                .unwrap_or("unknown status")
                .to_string(),
        })
    }
}
