use api::App;
use client::{error::Error, session, timer, AdminBoard, Client, Phase, TestSession};
use db::Memory;
use hyper::StatusCode;
use model::{Band, Draft, PageRequest, QuestionId};
use std::{
    collections::HashMap,
    net::{Ipv4Addr, SocketAddr},
    num::NonZeroU32,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};

struct Server {
    addr: SocketAddr,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl Server {
    async fn start() -> Self {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop, stopped) = oneshot::channel::<()>();
        let app = Arc::new(App::new(Memory::default(), None));
        let handle = tokio::spawn(mocktest::serve(listener, app, async move {
            let _ = stopped.await;
        }));
        Self { addr, stop, handle }
    }

    fn client(&self) -> Client {
        Client::new(format!("http://{}/api/", self.addr))
    }

    async fn stop(self) {
        self.stop.send(()).unwrap();
        self.handle.await.unwrap().unwrap();
    }
}

fn draft(text: &str, answer: i64) -> Draft {
    Draft {
        text: Some(text.into()),
        options: Some(["Alpha", "Beta", "Gamma", "Delta"].map(String::from).into()),
        correct_answer_index: Some(answer),
    }
}

/// Creates `count` questions and returns their answer key.
async fn seed(client: &Client, count: i64) -> HashMap<QuestionId, u32> {
    let mut key = HashMap::new();
    for n in 0..count {
        let question = client.create_question(&draft(&format!("Question #{n}"), n % 4)).await.unwrap();
        key.insert(question.id, u32::from(question.correct_answer_index));
    }
    key
}

#[tokio::test]
async fn health_and_errors() {
    let server = Server::start().await;
    let client = server.client();
    assert_eq!(client.health().await.unwrap(), "Healthy");

    let missing = QuestionId::new(404).unwrap();
    let err = client.get_question(missing).await.unwrap_err();
    assert_eq!(err, Error::Status { code: StatusCode::NOT_FOUND, message: "Question not found".into() });

    let err = client.create_question(&Draft::default()).await.unwrap_err();
    assert_eq!(err, Error::Status { code: StatusCode::BAD_REQUEST, message: "Validation failed".into() });

    let err = client.submit_answers(Vec::new()).await.unwrap_err();
    assert_eq!(err, Error::Status { code: StatusCode::BAD_REQUEST, message: "Answers are required".into() });

    server.stop().await;
}

#[tokio::test]
async fn take_a_test() {
    let server = Server::start().await;
    let client = server.client();
    let key = seed(&client, 14).await;

    let session = Mutex::new(TestSession::default());
    session::start(&session, &client).await.unwrap();

    let questions = session::lock(&session).questions().to_vec();
    assert_eq!(questions.len(), 10);
    for (n, question) in questions.iter().enumerate() {
        let correct = key[&question.id];
        let selected = if n < 5 { correct } else { (correct + 1) % 4 };
        assert!(session::lock(&session).set_answer(question.id, selected));
    }

    let result = session::submit(&session, &client).await.unwrap();
    assert_eq!((result.correct_count, result.total), (5, 10));
    assert_eq!(result.percentage, 50.0);
    assert_eq!(result.band(), Band::Five);

    let session = session.into_inner().unwrap();
    assert_eq!(*session.phase(), Phase::Finished(result));
    assert!(!session.countdown().is_running());

    server.stop().await;
}

#[tokio::test]
async fn timed_out_test_is_submitted() {
    let server = Server::start().await;
    let client = server.client();
    let key = seed(&client, 4).await;

    let session = Mutex::new(TestSession::new(NonZeroU32::new(3).unwrap()));
    session::start(&session, &client).await.unwrap();
    let questions = session::lock(&session).questions().to_vec();
    assert_eq!(questions.len(), 4);
    let first = &questions[0];
    assert!(session::lock(&session).set_answer(first.id, key[&first.id]));

    // Three short ticks run the countdown out.
    let answers = timer::drive(&session, Duration::from_millis(5)).await.unwrap();
    assert_eq!(*session::lock(&session).phase(), Phase::Submitting);

    let result = session::deliver(&session, &client, answers).await.unwrap();
    assert_eq!((result.correct_count, result.total), (1, 1));
    assert_eq!(result.percentage, 100.0);

    let session = session.into_inner().unwrap();
    assert_eq!(*session.phase(), Phase::Finished(result));
    assert!(!session.countdown().is_running());

    server.stop().await;
}

#[tokio::test]
async fn manage_questions() {
    let server = Server::start().await;
    let client = server.client();
    seed(&client, 12).await;

    let page = client
        .list_questions(PageRequest { number: NonZeroU32::new(3).unwrap(), size: NonZeroU32::new(5).unwrap() })
        .await
        .unwrap();
    assert_eq!(page.content.len(), 2);
    assert_eq!(page.page.total_pages, 3);

    let mut board = AdminBoard::default();
    board.refresh(&client).await.unwrap();
    assert_eq!(board.questions().len(), 10);
    assert_eq!(board.total_questions(), 12);

    // A rejected form stays open with the error.
    board.open_form(None);
    let err = board.save(&client, draft("   ", 1)).await.unwrap_err();
    assert!(matches!(err, Error::Status { code: StatusCode::BAD_REQUEST, .. }));
    assert!(board.is_form_open());
    assert_eq!(board.error(), Some("Validation failed"));

    let created = board.save(&client, draft("Which option is third?", 2)).await.unwrap();
    assert!(!board.is_form_open());
    assert_eq!(board.questions()[0].id, created.id);
    assert_eq!(board.total_questions(), 13);

    board.open_form(Some(created.clone()));
    let edit = Draft { text: Some("Which option is first?".into()), options: None, correct_answer_index: Some(0) };
    let edited = board.save(&client, edit).await.unwrap();
    assert_eq!(edited.id, created.id);
    assert_eq!(edited.options, created.options);
    assert_eq!(edited.correct_answer_index, 0);
    assert_eq!(board.questions()[0].text, "Which option is first?");
    assert_eq!(client.get_question(created.id).await.unwrap(), edited);

    board.delete(&client, created.id).await.unwrap();
    assert_eq!(board.total_questions(), 12);
    assert!(board.delete(&client, created.id).await.is_err());
    assert_eq!(board.error(), Some("Question not found"));

    server.stop().await;
}
