//! Kafka destination backed by an rdkafka `FutureProducer`.

use async_trait::async_trait;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use rdkafka::ClientConfig;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::config::KafkaAttrs;
use crate::output::{Output, OutputError, OutputId, OutputKind};

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct KafkaOutput {
    id: OutputId,
    attrs: KafkaAttrs,
    producer: Mutex<Option<FutureProducer>>,
}

impl KafkaOutput {
    pub fn new(attrs: KafkaAttrs) -> Self {
        Self {
            id: OutputId::derive(OutputKind::Kafka, &attrs),
            attrs,
            producer: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Output for KafkaOutput {
    fn id(&self) -> OutputId {
        self.id.clone()
    }

    fn kind(&self) -> OutputKind {
        OutputKind::Kafka
    }

    async fn activate(&self) -> Result<(), OutputError> {
        let mut producer = self.producer.lock().await;
        if producer.is_some() {
            return Err(OutputError::AlreadyActive);
        }

        let created: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &self.attrs.brokers)
            .set("message.timeout.ms", "5000")
            .create()
            .map_err(|e| OutputError::Kafka(e.to_string()))?;
        *producer = Some(created);
        Ok(())
    }

    async fn deactivate(&self) -> Result<(), OutputError> {
        let mut producer = self.producer.lock().await;
        match producer.take() {
            // Dropping the producer flushes and closes the client.
            Some(_) => Ok(()),
            None => Err(OutputError::NotActive),
        }
    }

    async fn write(&self, payload: &[u8]) -> Result<usize, OutputError> {
        let producer = self.producer.lock().await;
        let producer = producer.as_ref().ok_or(OutputError::NullOutput)?;

        let record = FutureRecord::<(), [u8]>::to(&self.attrs.topic).payload(payload);
        producer
            .send(record, Timeout::After(DELIVERY_TIMEOUT))
            .await
            .map_err(|(e, _)| OutputError::Kafka(e.to_string()))?;
        Ok(payload.len())
    }
}
