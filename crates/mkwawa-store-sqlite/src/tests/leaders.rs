use mkwawa_core::{
  Error as CoreError, ids,
  leader::{LeaderForm, LeaderQuery, Occupation},
  member::{Gender, MemberQuery},
  settings::CellForm,
  store::ParishStore,
};
use uuid::Uuid;

use super::{core, d, member, member_form, outstation, store};
use crate::encode::encode_uuid;

fn form(member: Uuid, occupation: Occupation, outstation_id: Option<Uuid>) -> LeaderForm {
  LeaderForm {
    church_member_id: member,
    occupation,
    start_date: d(2019, 1, 6),
    responsibilities: "Leads Sunday worship".into(),
    outstation_id,
  }
}

#[tokio::test]
async fn saving_a_leader_flags_the_member() {
  let s = store().await;
  let m = member(&s, "Elia Swai", Gender::Male, "255713000001").await;
  let leader = s.upsert_leader(form(m.id, Occupation::Elder, None)).await.unwrap();
  assert!(ids::is_leader_id(&leader.leader_id));
  assert_eq!(leader.church_member_id, m.id);

  let m = s.get_member(m.id).await.unwrap().unwrap();
  assert!(m.is_leader);

  let view = s.get_leader(leader.id).await.unwrap().unwrap();
  assert_eq!(view.full_name, "Elia Swai");
  assert_eq!(view.leader.occupation, Occupation::Elder);
}

#[tokio::test]
async fn only_flagged_members_are_listed() {
  let s = store().await;
  let m = member(&s, "Elia", Gender::Male, "255713000003").await;
  s.upsert_leader(form(m.id, Occupation::Elder, None)).await.unwrap();
  s.execute_batch(format!("UPDATE members SET is_leader = 0 WHERE id = '{}'", encode_uuid(m.id)))
    .await
    .unwrap();
  assert!(s.list_leaders(LeaderQuery::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn saving_again_updates_in_place() {
  let s = store().await;
  let m = member(&s, "Elia", Gender::Male, "255713000002").await;
  let first = s.upsert_leader(form(m.id, Occupation::Elder, None)).await.unwrap();
  s.save_time_in_service(first.id, "2 years".into()).await.unwrap();

  let second = s.upsert_leader(form(m.id, Occupation::Secretary, None)).await.unwrap();
  assert_eq!(second.id, first.id);
  assert_eq!(second.leader_id, first.leader_id);
  assert_eq!(second.occupation, Occupation::Secretary);
  assert_eq!(second.time_in_service, None);
  assert_eq!(s.list_leaders(LeaderQuery::default()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn evangelist_needs_an_outstation() {
  let s = store().await;
  let m = member(&s, "Elia", Gender::Male, "255713000003").await;
  let err = s.upsert_leader(form(m.id, Occupation::Evangelist, None)).await.unwrap_err();
  assert!(matches!(core(err), CoreError::EvangelistOutstationRequired));
  assert!(!s.get_member(m.id).await.unwrap().unwrap().is_leader);

  let os = outstation(&s, "Kihesa").await;
  let leader = s
    .upsert_leader(form(m.id, Occupation::Evangelist, Some(os.id)))
    .await
    .unwrap();
  assert_eq!(leader.outstation_id, Some(os.id));
}

#[tokio::test]
async fn unknown_member_is_not_found() {
  let s = store().await;
  let err = s
    .upsert_leader(form(Uuid::new_v4(), Occupation::Deacon, None))
    .await
    .unwrap_err();
  assert!(matches!(core(err), CoreError::NotFound { entity: "member", .. }));
}

#[tokio::test]
async fn list_filters_by_occupation_gender_and_outstation() {
  let s = store().await;
  let os = outstation(&s, "Kihesa").await;
  let cell = s
    .create_cell(CellForm {
      name:          "Jumuiya 2".into(),
      outstation_id: os.id,
      description:   None,
      location:      "Kihesa".into(),
    })
    .await
    .unwrap();

  let a = member(&s, "Amina", Gender::Female, "255713000010").await;
  let b = member(&s, "Bakari", Gender::Male, "255713000011").await;
  let mut in_cell = member_form("Consolata", Gender::Female, "255713000012");
  in_cell.cell_id = Some(cell.id);
  let c = s
    .create_member(in_cell, mkwawa_core::member::MemberStatus::Active)
    .await
    .unwrap();

  s.upsert_leader(form(a.id, Occupation::ChildrensPastor, None)).await.unwrap();
  s.upsert_leader(form(b.id, Occupation::Evangelist, Some(os.id))).await.unwrap();
  s.upsert_leader(form(c.id, Occupation::Deacon, None)).await.unwrap();

  let all = s.list_leaders(LeaderQuery::default()).await.unwrap();
  let names: Vec<_> = all.iter().map(|v| v.full_name.as_str()).collect();
  assert_eq!(names, ["Amina", "Bakari", "Consolata"]);

  let pastors = LeaderQuery { occupation: Some(Occupation::ChildrensPastor), ..Default::default() };
  assert_eq!(s.list_leaders(pastors).await.unwrap()[0].full_name, "Amina");

  let women = LeaderQuery { gender: Some(Gender::Female), ..Default::default() };
  assert_eq!(s.list_leaders(women).await.unwrap().len(), 2);

  let at_outstation = LeaderQuery { outstation_id: Some(os.id), ..Default::default() };
  let names: Vec<_> = s
    .list_leaders(at_outstation)
    .await
    .unwrap()
    .into_iter()
    .map(|v| v.full_name)
    .collect();
  assert_eq!(names, ["Bakari", "Consolata"]);
}

#[tokio::test]
async fn deleting_leader_clears_the_flag() {
  let s = store().await;
  let m = member(&s, "Elia", Gender::Male, "255713000020").await;
  let leader = s.upsert_leader(form(m.id, Occupation::Elder, None)).await.unwrap();
  s.delete_leader(leader.id).await.unwrap();

  assert!(s.get_leader(leader.id).await.unwrap().is_none());
  let leaders = MemberQuery { is_leader: Some(true), ..Default::default() };
  assert!(s.list_members(leaders).await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_member_removes_leader_record() {
  let s = store().await;
  let m = member(&s, "Elia", Gender::Male, "255713000030").await;
  let leader = s.upsert_leader(form(m.id, Occupation::Elder, None)).await.unwrap();
  s.delete_member(m.id).await.unwrap();
  assert!(s.get_leader(leader.id).await.unwrap().is_none());
}
